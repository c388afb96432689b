//! Canonical metrics and the row-matching rule table.
//!
//! The substring patterns and plausibility floors that decide which table row
//! feeds which metric are data, not code: [`default_rules`] builds the
//! standard [`MetricRule`] table, and
//! [`crate::config::ExtractionConfigBuilder::rules`] can replace it wholesale.
//! Keeping the heuristics in one inspectable table means they can be tuned and
//! tested without touching the extraction plumbing.
//!
//! ## Default rule table
//!
//! | Metric | Required substrings (all) | Excluded substrings (none) | Floor |
//! |--------|---------------------------|----------------------------|-------|
//! | TotalRevenue | "total revenue" | | 100 000 |
//! | DirectCosts | "direct costs" | | 50 000 |
//! | Ebitda | "ebitda", "earnings before interest" | | 100 000 |
//! | OperatingProfit | "operating profit" | | 50 000 |
//! | ProfitBeforeTax | "profit before", "tax" | | 50 000 |
//! | NetProfit | "profit for the year" | "attributable" | 30 000 |
//!
//! Rules are evaluated in table order; the first rule whose patterns match
//! classifies the row. The floor is a minimum absolute magnitude (values are
//! KShs millions), used to reject note references and column-header years
//! masquerading as figures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of income-statement line items tracked by the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CanonicalMetric {
    TotalRevenue,
    DirectCosts,
    Ebitda,
    OperatingProfit,
    ProfitBeforeTax,
    NetProfit,
}

impl CanonicalMetric {
    /// Every metric, in output-column order.
    pub const ALL: [CanonicalMetric; 6] = [
        CanonicalMetric::TotalRevenue,
        CanonicalMetric::DirectCosts,
        CanonicalMetric::Ebitda,
        CanonicalMetric::OperatingProfit,
        CanonicalMetric::ProfitBeforeTax,
        CanonicalMetric::NetProfit,
    ];

    /// Human-readable name used in reports and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            CanonicalMetric::TotalRevenue => "Total Revenue",
            CanonicalMetric::DirectCosts => "Direct Costs",
            CanonicalMetric::Ebitda => "EBITDA",
            CanonicalMetric::OperatingProfit => "Operating Profit",
            CanonicalMetric::ProfitBeforeTax => "Profit Before Tax",
            CanonicalMetric::NetProfit => "Net Profit",
        }
    }

    /// Column header in the flat-file output contract. These strings are
    /// stable: downstream consumers match on them byte for byte.
    pub fn column_label(&self) -> &'static str {
        match self {
            CanonicalMetric::TotalRevenue => "Total Revenue (KShs M)",
            CanonicalMetric::DirectCosts => "Direct Costs (KShs M)",
            CanonicalMetric::Ebitda => "EBITDA (KShs M)",
            CanonicalMetric::OperatingProfit => "Operating Profit (KShs M)",
            CanonicalMetric::ProfitBeforeTax => "Profit Before Tax (KShs M)",
            CanonicalMetric::NetProfit => "Net Profit (KShs M)",
        }
    }
}

impl fmt::Display for CanonicalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One row-classification rule: substring patterns plus a plausibility floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRule {
    /// Metric this rule assigns.
    pub metric: CanonicalMetric,
    /// Substrings that must ALL appear in the lowercased row text.
    pub required: Vec<String>,
    /// Substrings that must NOT appear in the lowercased row text.
    pub excluded: Vec<String>,
    /// Minimum absolute magnitude for an accepted cell value.
    pub floor: f64,
}

impl MetricRule {
    /// Build a rule; patterns are stored lowercased.
    pub fn new(metric: CanonicalMetric, required: &[&str], excluded: &[&str], floor: f64) -> Self {
        Self {
            metric,
            required: required.iter().map(|s| s.to_lowercase()).collect(),
            excluded: excluded.iter().map(|s| s.to_lowercase()).collect(),
            floor,
        }
    }

    /// Whether this rule matches the given row text.
    ///
    /// `row_text` must already be lowercased (see
    /// [`crate::pipeline::rows::RawRow::text`]).
    pub fn matches(&self, row_text: &str) -> bool {
        self.required.iter().all(|p| row_text.contains(p.as_str()))
            && !self.excluded.iter().any(|p| row_text.contains(p.as_str()))
    }

    /// Whether a normalized value clears this rule's plausibility floor.
    pub fn plausible(&self, value: f64) -> bool {
        value.abs() > self.floor
    }
}

/// The standard rule table (see the module docs for the full listing).
pub fn default_rules() -> Vec<MetricRule> {
    vec![
        MetricRule::new(CanonicalMetric::TotalRevenue, &["total revenue"], &[], 100_000.0),
        MetricRule::new(CanonicalMetric::DirectCosts, &["direct costs"], &[], 50_000.0),
        MetricRule::new(
            CanonicalMetric::Ebitda,
            &["ebitda", "earnings before interest"],
            &[],
            100_000.0,
        ),
        MetricRule::new(CanonicalMetric::OperatingProfit, &["operating profit"], &[], 50_000.0),
        MetricRule::new(
            CanonicalMetric::ProfitBeforeTax,
            &["profit before", "tax"],
            &[],
            50_000.0,
        ),
        MetricRule::new(
            CanonicalMetric::NetProfit,
            &["profit for the year"],
            &["attributable"],
            30_000.0,
        ),
    ]
}

/// First-write-wins store for one document's metrics.
///
/// Annual reports repeat line items in the notes, often with sub-totals that
/// would otherwise overwrite the statement figure. The accumulator makes the
/// "already set" guard explicit: the first accepted value for a metric is the
/// value for that document.
#[derive(Debug, Clone, Default)]
pub struct MetricAccumulator {
    values: BTreeMap<CanonicalMetric, f64>,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value for `metric` unless one was already recorded.
    ///
    /// Returns `true` when the value was stored, `false` when an earlier row
    /// already claimed the metric.
    pub fn record(&mut self, metric: CanonicalMetric, value: f64) -> bool {
        use std::collections::btree_map::Entry;
        match self.values.entry(metric) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, metric: CanonicalMetric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn is_set(&self, metric: CanonicalMetric) -> bool {
        self.values.contains_key(&metric)
    }

    /// Number of metrics recorded so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the accumulator, yielding the recorded values.
    pub fn into_values(self) -> BTreeMap<CanonicalMetric, f64> {
        self.values
    }
}
