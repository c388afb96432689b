//! Output types: per-year records, per-document outcomes, batch results.
//!
//! Everything here is serde-serializable so the CLI's `--json` mode can emit
//! the full batch outcome for scripting. [`FiscalRecord`] is the persistent
//! unit: one row per fiscal year, written to the flat metrics table and read
//! back by the reporters. A metric the extractor could not obtain is `None`,
//! and stays `None` through every downstream step.

use crate::aggregate::AggregatedTable;
use crate::error::DocumentError;
use crate::metrics::CanonicalMetric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One fiscal year's normalized metrics.
///
/// Values are KShs millions. Absent entries mean the metric was unavailable
/// for that year (row never matched, or no cell cleared the floor) — never
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalRecord {
    /// Fiscal year the record covers.
    pub fiscal_year: u16,
    /// Extracted values keyed by metric; missing keys are unavailable.
    pub values: BTreeMap<CanonicalMetric, f64>,
}

impl FiscalRecord {
    /// An empty record: every metric unavailable.
    pub fn empty(fiscal_year: u16) -> Self {
        Self {
            fiscal_year,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, metric: CanonicalMetric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn set(&mut self, metric: CanonicalMetric, value: f64) {
        self.values.insert(metric, value);
    }

    /// Count of metrics present.
    pub fn found(&self) -> usize {
        self.values.len()
    }

    /// Count of metrics absent.
    pub fn missing(&self) -> usize {
        CanonicalMetric::ALL.len() - self.values.len()
    }

    /// True when no metric was extracted at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of one document's extraction pass.
///
/// Always carries a [`FiscalRecord`], even on failure — a failed document
/// contributes a fully-unavailable record so the aggregated table still has
/// one row per configured year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Fiscal year this document covers (from the manifest).
    pub fiscal_year: u16,
    /// Source PDF path.
    pub source: PathBuf,
    /// 1-based page where the income statement was located, if it was.
    pub located_page: Option<usize>,
    /// The extracted record.
    pub record: FiscalRecord,
    /// Wall-clock extraction time for this document.
    pub elapsed_ms: u64,
    /// Why the document aborted, when it did. `None` means the pass ran to
    /// completion (individual metrics may still be unavailable).
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a whole batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Per-document outcomes in manifest order.
    pub documents: Vec<DocumentResult>,
    /// Records merged and sorted ascending by fiscal year.
    pub table: AggregatedTable,
    /// Run statistics.
    pub stats: BatchStats,
}

impl BatchOutput {
    /// Treat any per-document failure as an error.
    ///
    /// The batch driver itself never fails a run because one document was
    /// bad; callers that want all-or-nothing semantics use this.
    pub fn into_result(self) -> Result<BatchOutput, crate::error::ExtractError> {
        if self.stats.documents_failed > 0 {
            Err(crate::error::ExtractError::PartialFailure {
                failed: self.stats.documents_failed,
                total: self.stats.documents_total,
            })
        } else {
            Ok(self)
        }
    }
}

/// Statistics for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub documents_total: usize,
    pub documents_extracted: usize,
    pub documents_failed: usize,
    /// Metric values found, summed across documents.
    pub metrics_found: usize,
    /// Metric values unavailable, summed across documents.
    pub metrics_missing: usize,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_has_every_metric_missing() {
        let r = FiscalRecord::empty(2024);
        assert_eq!(r.found(), 0);
        assert_eq!(r.missing(), 6);
        assert!(r.is_empty());
        assert_eq!(r.get(CanonicalMetric::TotalRevenue), None);
    }

    #[test]
    fn found_and_missing_partition_the_metric_set() {
        let mut r = FiscalRecord::empty(2025);
        r.set(CanonicalMetric::TotalRevenue, 388_674.0);
        r.set(CanonicalMetric::NetProfit, 45_761.0);
        assert_eq!(r.found(), 2);
        assert_eq!(r.missing(), 4);
        assert_eq!(r.found() + r.missing(), CanonicalMetric::ALL.len());
    }

    #[test]
    fn record_serializes_without_absent_metrics() {
        let mut r = FiscalRecord::empty(2023);
        r.set(CanonicalMetric::Ebitda, 208_756.0);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("Ebitda"), "got: {json}");
        assert!(!json.contains("NetProfit"), "got: {json}");
        let back: FiscalRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn into_result_reports_partial_failure() {
        let out = BatchOutput {
            documents: vec![],
            table: AggregatedTable::new(),
            stats: BatchStats {
                documents_total: 3,
                documents_extracted: 2,
                documents_failed: 1,
                ..BatchStats::default()
            },
        };
        let err = out.into_result().unwrap_err();
        assert!(err.to_string().contains("1/3"));
    }
}
