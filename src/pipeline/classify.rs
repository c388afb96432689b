//! Row classification: match rows against metric rules and pick a value.
//!
//! For every row the classifier asks each rule, in table order, whether the
//! row's label text matches. The first matching rule wins. The value is then
//! the leftmost cell that both parses as a number and clears the rule's
//! plausibility floor; on a statement page the leftmost figure column is the
//! current fiscal year, so this picks the right column without any column
//! geometry.
//!
//! A metric is recorded at most once per page. Later rows matching an
//! already-set metric are skipped, so a summary row near the top of the
//! statement beats a restated copy further down.

use tracing::{debug, warn};

use crate::metrics::{MetricAccumulator, MetricRule};
use crate::pipeline::normalize::normalize_value;
use crate::pipeline::rows::RawRow;

/// First rule whose patterns match the (lowercased) row text, if any.
pub fn classify_row<'a>(rules: &'a [MetricRule], row_text: &str) -> Option<&'a MetricRule> {
    rules.iter().find(|rule| rule.matches(row_text))
}

/// Leftmost cell that normalises to a plausible value for `rule`.
///
/// Cells that fail to parse (labels, note references, malformed numbers)
/// and parsed values at or below the floor (note numbers, per-share
/// figures) are passed over.
pub fn pick_value(rule: &MetricRule, cells: &[String]) -> Option<f64> {
    cells
        .iter()
        .filter_map(|cell| normalize_value(Some(cell)))
        .find(|v| rule.plausible(*v))
}

/// Scan rows in order, recording the first plausible value per metric.
pub fn scan_rows(rules: &[MetricRule], rows: &[RawRow]) -> MetricAccumulator {
    let mut acc = MetricAccumulator::new();

    for row in rows {
        if row.is_empty() {
            continue;
        }
        let Some(rule) = classify_row(rules, row.text()) else {
            continue;
        };
        if acc.is_set(rule.metric) {
            debug!(metric = %rule.metric, row = row.text(), "metric already set, skipping row");
            continue;
        }
        match pick_value(rule, row.cells()) {
            Some(value) => {
                debug!(metric = %rule.metric, value, "recorded metric");
                acc.record(rule.metric, value);
            }
            None => {
                warn!(
                    metric = %rule.metric,
                    row = row.text(),
                    "row matched but no cell cleared the plausibility floor"
                );
            }
        }
    }

    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{default_rules, CanonicalMetric};
    use crate::pipeline::rows::build_rows;

    fn scan(page: &str) -> MetricAccumulator {
        scan_rows(&default_rules(), &build_rows(page, 2))
    }

    #[test]
    fn classifies_a_comprehensive_income_page() {
        let page = "\
Total revenue                          384,433.0    373,492.0
Direct costs                          (131,464.0)  (128,022.0)
EBITDA (Earnings before interest, tax, depreciation and amortisation)  212,043.0  207,613.0
Operating profit                       159,200.0    151,839.0
Profit before income tax               139,942.0    122,692.0
Profit for the year                     38,974.0     52,480.0
Profit attributable to owners           42,663.0     62,274.0";
        let acc = scan(page);
        assert_eq!(acc.get(CanonicalMetric::TotalRevenue), Some(384_433.0));
        assert_eq!(acc.get(CanonicalMetric::DirectCosts), Some(-131_464.0));
        assert_eq!(acc.get(CanonicalMetric::Ebitda), Some(212_043.0));
        assert_eq!(acc.get(CanonicalMetric::OperatingProfit), Some(159_200.0));
        assert_eq!(acc.get(CanonicalMetric::ProfitBeforeTax), Some(139_942.0));
        assert_eq!(acc.get(CanonicalMetric::NetProfit), Some(38_974.0));
        assert_eq!(acc.len(), 6);
    }

    #[test]
    fn first_match_wins_on_repeated_rows() {
        let page = "\
Total revenue      384,433.0
Total revenue      999,999.0";
        let acc = scan(page);
        assert_eq!(acc.get(CanonicalMetric::TotalRevenue), Some(384_433.0));
    }

    #[test]
    fn attributable_row_is_excluded_from_net_profit() {
        let page = "\
Profit for the year attributable to owners of the parent   42,663.0
Profit for the year                                        38,974.0";
        let acc = scan(page);
        assert_eq!(acc.get(CanonicalMetric::NetProfit), Some(38_974.0));
    }

    #[test]
    fn ebitda_requires_both_label_fragments() {
        let rules = default_rules();
        assert!(classify_row(&rules, "ebitda (earnings before interest, tax)").is_some());
        // Bare "EBITDA" without the spelt-out phrase must not match.
        let matched = classify_row(&rules, "ebitda margin commentary");
        assert!(matched.is_none() || matched.unwrap().metric != CanonicalMetric::Ebitda);
    }

    #[test]
    fn floor_skips_note_references_and_small_figures() {
        // "5" is a note reference; 384,433.0 is the real figure.
        let page = "Total revenue   5   384,433.0";
        let acc = scan(page);
        assert_eq!(acc.get(CanonicalMetric::TotalRevenue), Some(384_433.0));
    }

    #[test]
    fn matched_row_with_no_plausible_cell_records_nothing() {
        let page = "Total revenue   5   12";
        let acc = scan(page);
        assert!(acc.is_empty());
    }

    #[test]
    fn scanning_the_same_rows_twice_is_idempotent() {
        let rows = build_rows("Total revenue   384,433.0", 2);
        let rules = default_rules();
        let once = scan_rows(&rules, &rows);
        let twice = {
            let mut doubled = rows.clone();
            doubled.extend(rows.clone());
            scan_rows(&rules, &doubled)
        };
        assert_eq!(
            once.get(CanonicalMetric::TotalRevenue),
            twice.get(CanonicalMetric::TotalRevenue)
        );
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn continuation_rows_classify_like_table_rows() {
        let split_layout = "Total revenue\n    384,433.0   373,492.0";
        let acc = scan(split_layout);
        assert_eq!(acc.get(CanonicalMetric::TotalRevenue), Some(384_433.0));
    }
}
