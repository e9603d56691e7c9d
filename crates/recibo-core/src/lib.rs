//! Core library for purchase receipt extraction.
//!
//! This crate provides:
//! - PDF text rendering, page by page
//! - Rule-based receipt field extraction (supplier, receipt number, date,
//!   exchange rate, VAT, perceptions, line items)
//! - Selection of the newest PDF in a directory
//! - JSON output of the extracted record

pub mod discovery;
pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod output;
pub mod pdf;

pub use discovery::select_latest_pdf;
pub use error::{ExtractionError, PdfError, ReciboError, Result};
pub use invoice::{extract, ExtractionResult, InvoiceExtractor, InvoiceParser, ReceiptParser};
pub use models::config::ReciboConfig;
pub use models::receipt::{InvoiceRecord, IssueDate, LineItem, ReceiptReference};
pub use pdf::{PdfExtractor, PdfProcessor};
