//! # pdf2fin
//!
//! Extract financial statement metrics from annual-report PDFs into
//! multi-year tables, reports, and charts.
//!
//! ## Why this crate?
//!
//! Annual reports bury a handful of income-statement figures inside hundreds
//! of pages of prose, and table extraction from PDFs yields noisy text:
//! comma-grouped thousands, parenthesized accounting negatives, note
//! references sitting next to real figures, labels split across lines. This
//! crate turns that noise into typed per-year records with one hard
//! guarantee: a value that cannot be parsed is reported as unavailable,
//! never silently as zero.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF (one per fiscal year)
//!  │
//!  ├─ 1. Input      validate path and %PDF magic bytes
//!  ├─ 2. Pages      extract per-page text (pdf-extract)
//!  ├─ 3. Locate     find the income statement near the page hint
//!  ├─ 4. Rows       split page text into rows of raw cells
//!  ├─ 5. Classify   rule table + normalizer + plausibility floors
//!  ├─ 6. Aggregate  merge records, derive margins and growth
//!  └─ 7. Report     CSV tables, text report, SVG charts, dashboard
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2fin::{run_batch, DocumentSpec, ExtractionConfig, StatementKind};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .document(
//!             DocumentSpec::new("reports/annual_2023.pdf", 2023)
//!                 .with_hint(StatementKind::ComprehensiveIncome, 188),
//!         )
//!         .document(
//!             DocumentSpec::new("reports/annual_2024.pdf", 2024)
//!                 .with_hint(StatementKind::ComprehensiveIncome, 181),
//!         )
//!         .build()?;
//!     let output = run_batch(&config)?;
//!     for record in output.table.records() {
//!         println!("FY{}: {} metrics found", record.fiscal_year, record.found());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2fin` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2fin = { version = "0.3", default-features = false }
//! ```
//!
//! ## Caveats
//!
//! The substring patterns, plausibility floors, and page hints are tuned for
//! one specific family of reports. They are configuration, not code — see
//! [`metrics::default_rules`] and [`ExtractionConfigBuilder::rules`] — but a
//! report that reorders rows or rewords line items can still mis-extract;
//! check the warnings the extractor logs for unavailable metrics.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use aggregate::{AggregatedTable, DerivedRow};
pub use config::{DocumentSpec, ExtractionConfig, ExtractionConfigBuilder, StatementKind};
pub use error::{DocumentError, ExtractError};
pub use extract::{extract_document, inspect, run_batch, run_batch_to_files, InspectReport};
pub use metrics::{default_rules, CanonicalMetric, MetricRule};
pub use output::{BatchOutput, BatchStats, DocumentResult, FiscalRecord};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
