//! Error types for the pdf2fin library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the current operation cannot proceed at all
//!   (unreadable manifest, bad input file, statement page never found).
//!   Returned as `Err(ExtractError)` from the top-level extraction functions.
//!
//! * [`DocumentError`] — **Non-fatal**: one document of a batch failed
//!   (corrupt PDF, statement not in the searched window) but the other
//!   documents are fine. Stored inside [`crate::output::DocumentResult`] so
//!   callers can inspect partial success rather than losing the whole batch
//!   to one bad report.
//!
//! An unavailable metric value is neither: it is an expected outcome,
//! represented as `Option::None` throughout and never as an error. Parse
//! failures must never surface as a zero or any other fabricated number.

use crate::config::StatementKind;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2fin library.
///
/// Per-document failures inside a batch use [`DocumentError`] and are stored
/// in [`crate::output::DocumentResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF structure is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The PDF parsed but contains no extractable text.
    #[error("PDF '{path}' contains no extractable text.\nScanned/image-only reports are not supported (OCR is out of scope).")]
    NoText { path: PathBuf },

    /// The named statement was not found in the searched page window.
    #[error("Statement '{statement}' not found in '{path}' (searched pages {first}-{last})\nCheck the page hint in the manifest against the printed report.")]
    StatementNotFound {
        path: PathBuf,
        statement: StatementKind,
        first: usize,
        last: usize,
    },

    // ── Manifest errors ───────────────────────────────────────────────────
    /// Could not read the document manifest file.
    #[error("Failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not valid JSON for a document list.
    #[error("Failed to parse manifest '{path}': {detail}\nExpected a JSON array of {{path, fiscal_year, page_hints}} objects.")]
    ManifestParse { path: PathBuf, detail: String },

    /// Two manifest entries claim the same fiscal year.
    #[error("Duplicate fiscal year {year} in the document manifest")]
    DuplicateFiscalYear { year: u16 },

    // ── Table file errors ─────────────────────────────────────────────────
    /// Could not read a previously written metrics table.
    #[error("Failed to read table '{path}': {source}")]
    TableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metrics table file does not follow the expected column contract.
    #[error("Failed to parse table '{path}' at line {line}: {detail}")]
    TableParse {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Some documents succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::BatchOutput::into_result`] when the caller
    /// wants to treat any per-document failure as an error.
    #[error("{failed}/{total} documents failed during extraction")]
    PartialFailure { failed: usize, total: usize },
}

impl ExtractError {
    /// Downgrade a fatal error into the per-document form used by the batch
    /// driver. The conversion is lossy: structured fields collapse into the
    /// rendered message where no dedicated variant exists.
    pub fn to_document_error(&self, fiscal_year: u16) -> DocumentError {
        match self {
            ExtractError::StatementNotFound {
                statement,
                first,
                last,
                ..
            } => DocumentError::StatementMissing {
                fiscal_year,
                statement: *statement,
                first: *first,
                last: *last,
            },
            other => DocumentError::Unreadable {
                fiscal_year,
                detail: other.to_string(),
            },
        }
    }
}

/// A non-fatal error for a single document in a batch.
///
/// Stored alongside [`crate::output::DocumentResult`] when a document fails.
/// The rest of the batch continues; the failed year's [`crate::FiscalRecord`]
/// is emitted with every metric unavailable.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The named statement was not found in the searched window.
    #[error("FY{fiscal_year}: statement '{statement}' not found (searched pages {first}-{last})")]
    StatementMissing {
        fiscal_year: u16,
        statement: StatementKind,
        first: usize,
        last: usize,
    },

    /// The PDF could not be opened, parsed, or yielded no text.
    #[error("FY{fiscal_year}: document unreadable: {detail}")]
    Unreadable { fiscal_year: u16, detail: String },
}
