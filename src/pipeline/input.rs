//! Input validation: check a manifest path points at a readable PDF.
//!
//! Validating the `%PDF` magic bytes up front turns "the parser blew up on
//! page 1" into "this file is not a PDF", with the offending path in the
//! message. Empty files and text files renamed `.pdf` are the common operator
//! mistakes here.

use crate::error::ExtractError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable, and starts with `%PDF`.
///
/// Returns the path unchanged on success so callers can chain into page
/// extraction.
pub fn validate_pdf(path: &Path) -> Result<PathBuf, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) if &magic == b"%PDF" => {}
        Ok(()) => {
            return Err(ExtractError::NotAPdf {
                path: path.to_path_buf(),
                magic,
            });
        }
        // Shorter than 4 bytes: cannot be a PDF either.
        Err(_) => {
            return Err(ExtractError::NotAPdf {
                path: path.to_path_buf(),
                magic: [0; 4],
            });
        }
    }

    debug!(path = %path.display(), "validated PDF input");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_file_not_found() {
        let err = validate_pdf(Path::new("/nonexistent/annual_2025.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }), "got {err:?}");
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"<html>not a pdf</html>").unwrap();
        match validate_pdf(&path).unwrap_err() {
            ExtractError::NotAPdf { magic, .. } => assert_eq!(&magic, b"<htm"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn truncated_file_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pdf");
        std::fs::write(&path, b"%P").unwrap();
        assert!(matches!(
            validate_pdf(&path).unwrap_err(),
            ExtractError::NotAPdf { .. }
        ));
    }

    #[test]
    fn pdf_magic_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.7\n...").unwrap();
        assert_eq!(validate_pdf(&path).unwrap(), path);
    }
}
