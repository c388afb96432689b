//! Flat-file tables: the stable CSV column contract.
//!
//! Two files, both one row per fiscal year ascending:
//!
//! - [`SUMMARY_FILE`] — `Fiscal Year` plus the six metric columns.
//! - [`ANALYSIS_FILE`] — the same plus the derived margin/growth columns.
//!
//! Unavailable values are written as empty fields and read back as absent;
//! they never round-trip through zero. Metric values carry one decimal place,
//! derived percentages two. No `csv` crate: fields are plain numbers and
//! fixed header strings, so hand-splitting on commas is unambiguous.

use crate::aggregate::{AggregatedTable, DerivedRow};
use crate::error::ExtractError;
use crate::metrics::CanonicalMetric;
use crate::output::FiscalRecord;
use std::path::Path;

/// Per-year metrics table file name.
pub const SUMMARY_FILE: &str = "income_statement_summary.csv";
/// Aggregated multi-year analysis file name.
pub const ANALYSIS_FILE: &str = "multi_year_analysis.csv";

const YEAR_COLUMN: &str = "Fiscal Year";

fn metric_header() -> String {
    let mut cols = vec![YEAR_COLUMN.to_string()];
    cols.extend(CanonicalMetric::ALL.iter().map(|m| m.column_label().to_string()));
    cols.join(",")
}

fn analysis_header() -> String {
    let mut header = metric_header();
    for col in DerivedRow::COLUMNS {
        header.push(',');
        header.push_str(col);
    }
    header
}

fn fmt_metric(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_default()
}

fn fmt_percent(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Render the per-year metrics table.
pub fn render_summary(table: &AggregatedTable) -> String {
    let mut out = metric_header();
    out.push('\n');
    for record in table.records() {
        out.push_str(&record.fiscal_year.to_string());
        for metric in CanonicalMetric::ALL {
            out.push(',');
            out.push_str(&fmt_metric(record.get(metric)));
        }
        out.push('\n');
    }
    out
}

/// Render the aggregated multi-year table with derived columns.
pub fn render_analysis(table: &AggregatedTable) -> String {
    let mut out = analysis_header();
    out.push('\n');
    for record in table.records() {
        out.push_str(&record.fiscal_year.to_string());
        for metric in CanonicalMetric::ALL {
            out.push(',');
            out.push_str(&fmt_metric(record.get(metric)));
        }
        let derived = table.derived(record.fiscal_year);
        for value in [
            derived.ebitda_margin,
            derived.operating_margin,
            derived.net_margin,
            derived.revenue_growth,
            derived.net_profit_growth,
        ] {
            out.push(',');
            out.push_str(&fmt_percent(value));
        }
        out.push('\n');
    }
    out
}

/// Write the per-year metrics table atomically.
pub fn write_summary(table: &AggregatedTable, path: &Path) -> Result<(), ExtractError> {
    super::write_atomic(path, &render_summary(table))
}

/// Write the aggregated multi-year table atomically.
pub fn write_analysis(table: &AggregatedTable, path: &Path) -> Result<(), ExtractError> {
    super::write_atomic(path, &render_analysis(table))
}

/// Read a metrics table back into an [`AggregatedTable`].
///
/// Accepts either file: the summary header, or the analysis header whose
/// derived columns are ignored on read (they are recomputed from the
/// metrics, so a stale file cannot smuggle in wrong percentages). Any other
/// header is a [`ExtractError::TableParse`]; so is a non-numeric metric
/// cell. Cells face the same anchored-decimal strictness as PDF tokens, so a
/// hand-edited `NaN` or `1e5` is a parse error rather than a smuggled value.
/// Empty cells are unavailable.
pub fn read_table(path: &Path) -> Result<AggregatedTable, ExtractError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ExtractError::TableRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_table(&raw, path)
}

fn parse_table(raw: &str, path: &Path) -> Result<AggregatedTable, ExtractError> {
    let parse_err = |line: usize, detail: String| ExtractError::TableParse {
        path: path.to_path_buf(),
        line,
        detail,
    };

    let mut lines = raw.lines().enumerate();
    let (_, header) = lines
        .next()
        .ok_or_else(|| parse_err(1, "file is empty".into()))?;
    if header != metric_header() && header != analysis_header() {
        return Err(parse_err(1, format!("unexpected header: {header:?}")));
    }
    let expected_fields = header.split(',').count();

    let mut table = AggregatedTable::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != expected_fields {
            return Err(parse_err(
                line_no,
                format!("expected {expected_fields} fields, got {}", fields.len()),
            ));
        }

        let fiscal_year: u16 = fields[0]
            .trim()
            .parse()
            .map_err(|_| parse_err(line_no, format!("bad fiscal year: {:?}", fields[0])))?;

        let mut record = FiscalRecord::empty(fiscal_year);
        for (metric, field) in CanonicalMetric::ALL.iter().zip(&fields[1..]) {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let value = crate::pipeline::normalize::parse_decimal(field).ok_or_else(|| {
                parse_err(
                    line_no,
                    format!("expected a number for '{}', got {field:?}", metric.column_label()),
                )
            })?;
            record.set(*metric, value);
        }
        // Derived fields past index 6, if present, are recomputed not read.
        if !table.insert(record) {
            return Err(parse_err(line_no, format!("duplicate fiscal year {fiscal_year}")));
        }
    }
    Ok(table)
}
