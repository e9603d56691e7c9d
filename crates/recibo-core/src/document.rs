//! Reading one input document and running extraction over it.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ReciboError, Result};
use crate::invoice::{ExtractionResult, InvoiceParser, ReceiptParser};
use crate::models::config::PdfConfig;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Kind of input document, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// PDF rendered to text page by page.
    Pdf,
    /// Text that was already extracted from a PDF.
    Text,
}

impl DocumentKind {
    /// Detect the kind from the extension of `path`, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Identifier recorded as the record's source: the file name of `path`.
pub fn source_identifier(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load the full text of a document.
pub fn load_text(path: &Path, pdf_config: &PdfConfig) -> Result<String> {
    match DocumentKind::from_path(path) {
        Some(DocumentKind::Pdf) => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::new().with_page_separator(pdf_config.page_separator.clone());
            extractor.load(&data)?;
            Ok(extractor.extract_text()?)
        }
        Some(DocumentKind::Text) => Ok(fs::read_to_string(path)?),
        None => Err(ReciboError::Config(format!(
            "unsupported file type: {}",
            path.display()
        ))),
    }
}

/// Load a document and extract its receipt record.
pub fn process_file(path: &Path, parser: &ReceiptParser, pdf_config: &PdfConfig) -> Result<ExtractionResult> {
    info!("Processing {}", path.display());
    let text = load_text(path, pdf_config)?;
    Ok(parser.parse(&text, &source_identifier(path))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_kind() {
        assert_eq!(DocumentKind::from_path(Path::new("a.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("a.txt")), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_path(Path::new("a.png")), None);
        assert_eq!(DocumentKind::from_path(Path::new("a")), None);
    }

    #[test]
    fn test_source_identifier_is_file_name() {
        assert_eq!(source_identifier(Path::new("./compras/factura.pdf")), "factura.pdf");
    }

    #[test]
    fn test_process_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factura.txt");
        fs::write(&path, "AGRONORTE S.R.L.\nNro.: 0004-00000001\n").unwrap();

        let result = process_file(&path, &ReceiptParser::new(), &PdfConfig::default()).unwrap();
        assert_eq!(result.record.source_file, "factura.txt");
        assert_eq!(result.record.supplier_name, "AGRONORTE S.R.L.");
        assert_eq!(result.record.receipt_reference.receipt_number, "00000001");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        fs::write(&path, b"png").unwrap();
        assert!(matches!(
            load_text(&path, &PdfConfig::default()),
            Err(ReciboError::Config(_))
        ));
    }
}
