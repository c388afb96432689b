//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the batch driver works through the document set. Callers can
//! forward events to a terminal progress bar, a log file, or a UI without the
//! library knowing anything about how the host application communicates.
//!
//! # Example
//!
//! ```rust
//! use pdf2fin::{BatchProgressCallback, DocumentSpec, ExtractionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, fiscal_year: u16, found: usize, missing: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("FY{fiscal_year}: {found} metrics found, {missing} missing");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .document(DocumentSpec::new("reports/annual_2025.pdf", 2025))
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! # drop(config);
//! ```

use std::sync::Arc;

/// Called by the batch driver as it processes each document.
///
/// Documents are processed sequentially, so methods are never called
/// concurrently; the `Send + Sync` bound only keeps the callback shareable
/// behind an `Arc`. All methods have default no-op implementations so callers
/// only override what they care about.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any document is opened.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document's extraction begins.
    ///
    /// `index` is 0-based within the batch.
    fn on_document_start(&self, fiscal_year: u16, index: usize, total_documents: usize) {
        let _ = (fiscal_year, index, total_documents);
    }

    /// Called when a document's extraction finished, with the count of
    /// metrics found and missing for that fiscal year.
    fn on_document_complete(&self, fiscal_year: u16, found: usize, missing: usize) {
        let _ = (fiscal_year, found, missing);
    }

    /// Called when a document's extraction aborted; the batch continues with
    /// the next document.
    fn on_document_error(&self, fiscal_year: u16, error: &str) {
        let _ = (fiscal_year, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, extracted: usize, failed: usize) {
        let _ = (extracted, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
