//! PDF text rendering module.

mod extractor;

pub use extractor::{join_pages, PdfExtractor, PdfPage};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text of every page, in page order. Fails if any page
    /// cannot be rendered.
    fn extract_pages(&self) -> Result<Vec<PdfPage>>;

    /// Extract the text of the whole document: non-empty pages joined by the
    /// page separator.
    fn extract_text(&self) -> Result<String>;
}
