//! Selection of input PDFs in a directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::error::Result;

/// Whether a file name ends with `.pdf`, ignoring ASCII case.
pub fn is_pdf_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".pdf")
}

/// List the PDF files directly inside `dir`, sorted by file name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(is_pdf_name) {
            pdfs.push(entry.path());
        }
    }

    pdfs.sort();
    Ok(pdfs)
}

/// Creation time of `path`, or its modification time where the platform does
/// not record creation.
fn created_at(path: &Path) -> Result<SystemTime> {
    let metadata = fs::metadata(path)?;
    Ok(metadata.created().or_else(|_| metadata.modified())?)
}

/// Pick the newest candidate. Equal timestamps go to the larger path.
pub fn newest(candidates: impl IntoIterator<Item = (SystemTime, PathBuf)>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .max_by(|(ta, pa), (tb, pb)| ta.cmp(tb).then_with(|| pa.cmp(pb)))
        .map(|(_, path)| path)
}

/// Select the most recently created PDF in `dir`.
///
/// Returns `Ok(None)` when the directory holds no PDF.
pub fn select_latest_pdf(dir: &Path) -> Result<Option<PathBuf>> {
    let mut candidates = Vec::new();

    for path in list_pdfs(dir)? {
        let created = created_at(&path)?;
        trace!("Candidate {} created {:?}", path.display(), created);
        candidates.push((created, path));
    }

    let latest = newest(candidates);
    match &latest {
        Some(path) => debug!("Selected {}", path.display()),
        None => debug!("No PDF files in {}", dir.display()),
    }

    Ok(latest)
}
