//! Page extraction: one PDF to one text string per page.
//!
//! `pdf_extract` can panic on malformed input rather than returning an error,
//! so the call is wrapped in `catch_unwind` and a panic becomes a
//! [`ExtractError::CorruptPdf`]. A document that parses but yields no text at
//! all (scanned/image-only report) is [`ExtractError::NoText`]; OCR is out of
//! scope.

use crate::error::ExtractError;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::debug;

/// Extract per-page text from a PDF file.
///
/// Returns one string per page, in document order. Pages with no text are
/// kept as empty strings so indices line up with 1-based page numbers.
pub fn extract_pages(path: &Path) -> Result<Vec<String>, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    }));
    let pages = match result {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            return Err(ExtractError::CorruptPdf {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
        }
        Err(_) => {
            return Err(ExtractError::CorruptPdf {
                path: path.to_path_buf(),
                detail: "text extraction panicked (malformed document)".into(),
            })
        }
    };

    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(ExtractError::NoText {
            path: path.to_path_buf(),
        });
    }

    debug!(pages = pages.len(), path = %path.display(), "extracted page text");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_corrupt_pdf_error() {
        let err = extract_pages(Path::new("/nonexistent/report.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::CorruptPdf { .. }), "got {err:?}");
    }

    #[test]
    fn garbage_bytes_are_a_corrupt_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pdf");
        std::fs::write(&path, b"%PDF-1.7 but nothing else here").unwrap();
        let err = extract_pages(&path).unwrap_err();
        assert!(matches!(err, ExtractError::CorruptPdf { .. }), "got {err:?}");
    }
}
