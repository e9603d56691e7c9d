//! Error types for the recibo-core library.

use thiserror::Error;

/// Main error type for the recibo library.
#[derive(Error, Debug)]
pub enum ReciboError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Receipt field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to receipt field extraction.
///
/// A field that is simply absent from the text is never an error; these
/// variants mean a pattern matched text that does not have the expected shape.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    /// A matched numeric group could not be parsed.
    #[error("failed to parse {field}: {value:?}")]
    Parse { field: String, value: String },

    /// A matched date did not split into day, month and year.
    #[error("malformed date {value:?}: expected DD/MM/YYYY")]
    MalformedDate { value: String },

    /// Converting an amount to local currency overflowed.
    #[error("{field} overflows when converted at rate {rate}")]
    Overflow { field: String, rate: String },
}

impl ExtractionError {
    pub(crate) fn parse(field: &str, value: &str) -> Self {
        Self::Parse {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result type for the recibo library.
pub type Result<T> = std::result::Result<T, ReciboError>;
