//! Aggregation: merge per-year records and derive margins and growth rates.
//!
//! The [`AggregatedTable`] holds at most one [`FiscalRecord`] per fiscal year,
//! kept sorted ascending. Every derived computation is guarded: when any
//! operand is unavailable the result is unavailable, never zero, never NaN.
//!
//! ## Growth sign convention
//!
//! Year-over-year growth divides by the **absolute** prior value:
//!
//! ```text
//! growth = (current − prior) / |prior| × 100
//! ```
//!
//! This is a deliberate accounting interpretation, not the generic
//! percentage-change formula. With a negative prior (a loss year), the
//! generic formula flips the sign: a loss narrowing from −100 to −50 would
//! report −50% "growth". Dividing by the magnitude keeps the sign aligned
//! with the direction of the change, which is how an analyst reads it.

use crate::metrics::CanonicalMetric;
use crate::output::FiscalRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Ordered multi-year table of fiscal records.
///
/// Invariant: at most one record per fiscal year, years ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTable {
    records: Vec<FiscalRecord>,
}

impl AggregatedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records. Duplicate years keep the first record
    /// seen; the input order otherwise does not matter.
    pub fn from_records(records: impl IntoIterator<Item = FiscalRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(record);
        }
        table
    }

    /// Insert one record, keeping the table sorted ascending by year.
    ///
    /// A record for a year already present is dropped with a warning; the
    /// first record wins, consistent with the classifier's first-wins guard.
    /// Returns `true` when the record was inserted.
    pub fn insert(&mut self, record: FiscalRecord) -> bool {
        if self.records.iter().any(|r| r.fiscal_year == record.fiscal_year) {
            warn!(
                fiscal_year = record.fiscal_year,
                "duplicate fiscal year at aggregation, keeping the first record"
            );
            return false;
        }
        let pos = self
            .records
            .partition_point(|r| r.fiscal_year < record.fiscal_year);
        self.records.insert(pos, record);
        true
    }

    /// Records in ascending fiscal-year order.
    pub fn records(&self) -> &[FiscalRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Fiscal years present, ascending.
    pub fn years(&self) -> Vec<u16> {
        self.records.iter().map(|r| r.fiscal_year).collect()
    }

    /// Record for one fiscal year.
    pub fn record(&self, year: u16) -> Option<&FiscalRecord> {
        self.records.iter().find(|r| r.fiscal_year == year)
    }

    /// Metric value for one year.
    pub fn value(&self, metric: CanonicalMetric, year: u16) -> Option<f64> {
        self.record(year)?.get(metric)
    }

    // ── Derived computations ─────────────────────────────────────────────

    /// Margin of `metric` over total revenue for `year`, in percent.
    ///
    /// Unavailable when either operand is unavailable or revenue is zero.
    pub fn margin(&self, metric: CanonicalMetric, year: u16) -> Option<f64> {
        let value = self.value(metric, year)?;
        let revenue = self.value(CanonicalMetric::TotalRevenue, year)?;
        if revenue == 0.0 {
            return None;
        }
        Some(value / revenue * 100.0)
    }

    /// Year-over-year growth of `metric` into `year`, in percent, against
    /// the nearest prior year present in the table.
    ///
    /// Unavailable when either operand is unavailable, there is no prior
    /// year, or the prior value is exactly zero. See the module docs for the
    /// sign convention.
    pub fn yoy_growth(&self, metric: CanonicalMetric, year: u16) -> Option<f64> {
        let current = self.value(metric, year)?;
        let prior_year = self.prior_year(year)?;
        let prior = self.value(metric, prior_year)?;
        if prior == 0.0 {
            return None;
        }
        Some((current - prior) / prior.abs() * 100.0)
    }

    /// Compound annual growth rate of `metric` across the whole table, in
    /// percent. The exponent uses the years spanned (`last_year −
    /// first_year`), so a gap year does not shrink the average.
    ///
    /// Unavailable when the table spans fewer than two years or the first or
    /// last value is unavailable or non-positive.
    pub fn cagr(&self, metric: CanonicalMetric) -> Option<f64> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        let span = last.fiscal_year.checked_sub(first.fiscal_year)?;
        if span == 0 {
            return None;
        }
        let first_value = first.get(metric)?;
        let last_value = last.get(metric)?;
        if first_value <= 0.0 || last_value <= 0.0 {
            return None;
        }
        Some(((last_value / first_value).powf(1.0 / f64::from(span)) - 1.0) * 100.0)
    }

    /// Nearest year in the table strictly before `year`.
    fn prior_year(&self, year: u16) -> Option<u16> {
        self.records
            .iter()
            .map(|r| r.fiscal_year)
            .filter(|&y| y < year)
            .max()
    }

    /// The derived row for one fiscal year: the margin and growth columns of
    /// the aggregated flat file.
    pub fn derived(&self, year: u16) -> DerivedRow {
        DerivedRow {
            ebitda_margin: self.margin(CanonicalMetric::Ebitda, year),
            operating_margin: self.margin(CanonicalMetric::OperatingProfit, year),
            net_margin: self.margin(CanonicalMetric::NetProfit, year),
            revenue_growth: self.yoy_growth(CanonicalMetric::TotalRevenue, year),
            net_profit_growth: self.yoy_growth(CanonicalMetric::NetProfit, year),
        }
    }
}

/// Derived columns for one fiscal year, all in percent and all optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub ebitda_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub net_profit_growth: Option<f64>,
}

impl DerivedRow {
    /// Column headers matching the fields, in file order.
    pub const COLUMNS: [&'static str; 5] = [
        "EBITDA Margin (%)",
        "Operating Margin (%)",
        "Net Margin (%)",
        "Revenue Growth (%)",
        "Net Profit Growth (%)",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: u16, pairs: &[(CanonicalMetric, f64)]) -> FiscalRecord {
        let mut r = FiscalRecord::empty(year);
        for &(m, v) in pairs {
            r.set(m, v);
        }
        r
    }

    fn revenue_table() -> AggregatedTable {
        AggregatedTable::from_records([
            record(2023, &[(CanonicalMetric::TotalRevenue, 352_301.0)]),
            record(2024, &[(CanonicalMetric::TotalRevenue, 395_926.0)]),
            record(2025, &[(CanonicalMetric::TotalRevenue, 440_305.0)]),
        ])
    }

    #[test]
    fn insert_keeps_years_ascending_regardless_of_input_order() {
        let table = AggregatedTable::from_records([
            record(2025, &[]),
            record(2023, &[]),
            record(2024, &[]),
        ]);
        assert_eq!(table.years(), vec![2023, 2024, 2025]);
    }

    #[test]
    fn duplicate_year_keeps_the_first_record() {
        let mut table = AggregatedTable::new();
        assert!(table.insert(record(2024, &[(CanonicalMetric::TotalRevenue, 1_000_000.0)])));
        assert!(!table.insert(record(2024, &[(CanonicalMetric::TotalRevenue, 2_000_000.0)])));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.value(CanonicalMetric::TotalRevenue, 2024),
            Some(1_000_000.0)
        );
    }

    #[test]
    fn margin_requires_both_operands() {
        let table = AggregatedTable::from_records([record(
            2024,
            &[
                (CanonicalMetric::TotalRevenue, 384_433.0),
                (CanonicalMetric::NetProfit, 38_974.0),
            ],
        )]);
        let margin = table.margin(CanonicalMetric::NetProfit, 2024).unwrap();
        assert!((margin - 10.14).abs() < 0.005, "got {margin}");
        // EBITDA missing: margin unavailable, not zero.
        assert_eq!(table.margin(CanonicalMetric::Ebitda, 2024), None);
        // No revenue at all: nothing has a margin.
        let bare = AggregatedTable::from_records([record(
            2024,
            &[(CanonicalMetric::NetProfit, 38_974.0)],
        )]);
        assert_eq!(bare.margin(CanonicalMetric::NetProfit, 2024), None);
    }

    #[test]
    fn margin_undefined_for_zero_revenue() {
        let table = AggregatedTable::from_records([record(
            2024,
            &[
                (CanonicalMetric::TotalRevenue, 0.0),
                (CanonicalMetric::NetProfit, 38_974.0),
            ],
        )]);
        assert_eq!(table.margin(CanonicalMetric::NetProfit, 2024), None);
    }

    #[test]
    fn yoy_growth_against_the_prior_year() {
        let table = revenue_table();
        let growth = table
            .yoy_growth(CanonicalMetric::TotalRevenue, 2024)
            .unwrap();
        assert!((growth - 12.38).abs() < 0.01, "got {growth}");
    }

    #[test]
    fn yoy_growth_spans_a_gap_year() {
        let table = AggregatedTable::from_records([
            record(2022, &[(CanonicalMetric::TotalRevenue, 300_000.0)]),
            record(2025, &[(CanonicalMetric::TotalRevenue, 450_000.0)]),
        ]);
        let growth = table
            .yoy_growth(CanonicalMetric::TotalRevenue, 2025)
            .unwrap();
        assert!((growth - 50.0).abs() < 1e-9, "got {growth}");
    }

    #[test]
    fn yoy_growth_unavailable_without_a_prior_value() {
        let table = revenue_table();
        assert_eq!(table.yoy_growth(CanonicalMetric::TotalRevenue, 2023), None);
        assert_eq!(table.yoy_growth(CanonicalMetric::NetProfit, 2024), None);
    }

    #[test]
    fn yoy_growth_undefined_for_zero_prior() {
        let table = AggregatedTable::from_records([
            record(2023, &[(CanonicalMetric::NetProfit, 0.0)]),
            record(2024, &[(CanonicalMetric::NetProfit, 40_000.0)]),
        ]);
        assert_eq!(table.yoy_growth(CanonicalMetric::NetProfit, 2024), None);
    }

    #[test]
    fn growth_sign_is_correct_across_a_loss_year() {
        // Loss narrows from -100,000 to -50,000: that is improvement, +50%.
        let table = AggregatedTable::from_records([
            record(2023, &[(CanonicalMetric::NetProfit, -100_000.0)]),
            record(2024, &[(CanonicalMetric::NetProfit, -50_000.0)]),
        ]);
        let growth = table.yoy_growth(CanonicalMetric::NetProfit, 2024).unwrap();
        assert!((growth - 50.0).abs() < 1e-9, "got {growth}");

        // Swing from loss to profit stays positive.
        let table = AggregatedTable::from_records([
            record(2023, &[(CanonicalMetric::NetProfit, -50_000.0)]),
            record(2024, &[(CanonicalMetric::NetProfit, 50_000.0)]),
        ]);
        let growth = table.yoy_growth(CanonicalMetric::NetProfit, 2024).unwrap();
        assert!((growth - 200.0).abs() < 1e-9, "got {growth}");
    }

    #[test]
    fn cagr_over_three_years() {
        let table = revenue_table();
        let cagr = table.cagr(CanonicalMetric::TotalRevenue).unwrap();
        // ((440305/352301)^(1/2) - 1) * 100
        assert!((cagr - 11.8).abs() < 0.05, "got {cagr}");
    }

    #[test]
    fn cagr_unavailable_for_short_or_gappy_endpoints() {
        let single = AggregatedTable::from_records([record(
            2024,
            &[(CanonicalMetric::TotalRevenue, 1_000_000.0)],
        )]);
        assert_eq!(single.cagr(CanonicalMetric::TotalRevenue), None);

        let missing_end = AggregatedTable::from_records([
            record(2023, &[(CanonicalMetric::TotalRevenue, 352_301.0)]),
            record(2025, &[]),
        ]);
        assert_eq!(missing_end.cagr(CanonicalMetric::TotalRevenue), None);
    }

    #[test]
    fn cagr_undefined_for_non_positive_endpoints() {
        let table = AggregatedTable::from_records([
            record(2023, &[(CanonicalMetric::NetProfit, -40_000.0)]),
            record(2025, &[(CanonicalMetric::NetProfit, 40_000.0)]),
        ]);
        assert_eq!(table.cagr(CanonicalMetric::NetProfit), None);
    }

    #[test]
    fn cagr_exponent_uses_years_spanned() {
        // 2022 -> 2025 quadrupling over 3 years: cube root of 4.
        let table = AggregatedTable::from_records([
            record(2022, &[(CanonicalMetric::TotalRevenue, 100_000.0)]),
            record(2025, &[(CanonicalMetric::TotalRevenue, 400_000.0)]),
        ]);
        let cagr = table.cagr(CanonicalMetric::TotalRevenue).unwrap();
        let expected = (4.0_f64.powf(1.0 / 3.0) - 1.0) * 100.0;
        assert!((cagr - expected).abs() < 1e-9, "got {cagr}");
    }

    #[test]
    fn derived_row_collects_the_flat_file_columns() {
        let table = AggregatedTable::from_records([
            record(
                2024,
                &[
                    (CanonicalMetric::TotalRevenue, 395_926.0),
                    (CanonicalMetric::Ebitda, 199_530.0),
                    (CanonicalMetric::NetProfit, 42_663.0),
                ],
            ),
            record(
                2025,
                &[
                    (CanonicalMetric::TotalRevenue, 440_305.0),
                    (CanonicalMetric::NetProfit, 45_761.0),
                ],
            ),
        ]);
        let d24 = table.derived(2024);
        assert!(d24.ebitda_margin.is_some());
        assert!(d24.operating_margin.is_none());
        assert!(d24.revenue_growth.is_none(), "2024 has no prior year");

        let d25 = table.derived(2025);
        assert!(d25.revenue_growth.is_some());
        assert!(d25.net_profit_growth.is_some());
        assert!(d25.ebitda_margin.is_none(), "no 2025 EBITDA extracted");
    }
}
