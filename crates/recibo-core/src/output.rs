//! JSON output for extracted receipts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::debug;

use crate::error::Result;
use crate::models::receipt::InvoiceRecord;

/// Output path for `input`: same location, `.json` extension.
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("json")
}

/// Serialize a record as pretty JSON indented by `indent` spaces.
///
/// Non-ASCII text is written as UTF-8, not escaped.
pub fn to_json(record: &InvoiceRecord, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    record.serialize(&mut ser)?;
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Write a record to `path`.
pub fn write_record(record: &InvoiceRecord, path: &Path, indent: usize) -> Result<()> {
    let json = to_json(record, indent)?;
    fs::write(path, json)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
