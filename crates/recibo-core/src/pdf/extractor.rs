//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
///
/// Pages are rendered one by one with lopdf. When no page yields text the
/// whole document goes through pdf-extract instead.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    page_separator: String,
}

/// Text from a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text, trailing whitespace removed.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            page_separator: "\n".to_string(),
        }
    }

    /// Set the separator placed between non-empty pages.
    pub fn with_page_separator(mut self, separator: impl Into<String>) -> Self {
        self.page_separator = separator.into();
        self
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn extract_with_pdf_extract(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map(|text| text.trim_end().to_string())
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Join page texts with `separator`, skipping pages without text.
pub fn join_pages<'a>(pages: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    pages
        .into_iter()
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Render one page. A page that cannot be rendered is an error, never a
/// blank page.
fn page_text(doc: &Document, number: u32) -> Result<PdfPage> {
    let text = doc
        .extract_text(&[number])
        .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", number, e)))?;
    let text = text.trim_end().to_string();
    trace!("Page {}: {} chars", number, text.len());
    Ok(PdfPage { number, text })
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads raw bytes, so keep the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Result<Vec<PdfPage>> {
        let doc = self.document()?;

        doc.get_pages()
            .into_keys()
            .map(|number| page_text(doc, number))
            .collect()
    }

    fn extract_text(&self) -> Result<String> {
        let pages = match self.extract_pages() {
            Ok(pages) => pages,
            Err(e @ PdfError::TextExtraction(_)) => {
                warn!("{}, falling back to pdf-extract", e);
                return self.extract_with_pdf_extract();
            }
            Err(e) => return Err(e),
        };
        let text = join_pages(pages.iter().map(|p| p.text.as_str()), &self.page_separator);

        if !text.is_empty() {
            return Ok(text);
        }

        debug!("No page text from lopdf, falling back to pdf-extract");
        self.extract_with_pdf_extract()
    }
}
