//! Reporters: render the aggregated table as flat files, text, charts, and a
//! dashboard.
//!
//! Reporters run as separate steps downstream of extraction: they consume the
//! aggregated flat file (read back via [`table::read_table`]), never the
//! extractor's in-memory state. Every renderer tolerates unavailable values
//! by omitting the affected cell, sentence, or series — a gap in the data is
//! a gap in the report, not a failure.

pub mod chart;
pub mod dashboard;
pub mod table;
pub mod text;

use crate::error::ExtractError;
use std::path::Path;

/// Write a file atomically: temp file in the same directory, then rename.
/// Parent directories are created as needed.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), ExtractError> {
    let wrap = |e: std::io::Error| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents).map_err(wrap)?;
    std::fs::rename(&tmp, path).map_err(wrap)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/out.csv");
        write_atomic(&path, "Fiscal Year\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Fiscal Year\n");
        assert!(!path.with_extension("tmp").exists());
    }
}
