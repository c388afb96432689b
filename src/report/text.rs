//! Plain-text analysis report.
//!
//! A fixed-width report for reading in a terminal or pasting into an email:
//! executive summary, key findings per year, the detailed metric table,
//! margin-trend observations, and a methodology note. Any sentence whose
//! operands are unavailable is omitted, so a sparse table produces a shorter
//! report rather than a broken one.

use crate::aggregate::AggregatedTable;
use crate::error::ExtractError;
use crate::metrics::CanonicalMetric;
use chrono::Local;
use std::fmt::Write as _;
use std::path::Path;

const RULE: &str =
    "================================================================================";
const THIN: &str =
    "--------------------------------------------------------------------------------";

/// Render the full text report.
pub fn render_report(table: &AggregatedTable) -> String {
    let mut out = String::new();
    let years = table.years();
    let period = match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => format!("FY {first} - FY {last}"),
        (Some(only), _) => format!("FY {only}"),
        _ => "no data".to_string(),
    };

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "FINANCIAL ANALYSIS REPORT ({period})");
    let _ = writeln!(out, "{RULE}");
    out.push('\n');

    // ── Executive summary ────────────────────────────────────────────────
    let _ = writeln!(out, "EXECUTIVE SUMMARY");
    let _ = writeln!(out, "{THIN}");
    let _ = writeln!(out, "Analysis Period: {period}");
    let _ = writeln!(out, "Currency: Kenya Shillings (KShs) - Millions");
    let _ = writeln!(out, "Generated: {}", Local::now().format("%Y-%m-%d"));
    out.push('\n');

    // ── Key findings ─────────────────────────────────────────────────────
    let _ = writeln!(out, "KEY FINDINGS:");
    out.push('\n');
    let mut finding = 1;

    if let Some(cagr) = table.cagr(CanonicalMetric::TotalRevenue) {
        let _ = writeln!(out, "{finding}. Revenue CAGR ({period}): {cagr:.2}%");
        for &year in &years {
            if let Some(revenue) = table.value(CanonicalMetric::TotalRevenue, year) {
                let growth = table
                    .yoy_growth(CanonicalMetric::TotalRevenue, year)
                    .map(|g| format!(" ({g:+.1}%)"))
                    .unwrap_or_default();
                let _ = writeln!(out, "   - FY {year}: KShs {revenue:.0}M{growth}");
            }
        }
        out.push('\n');
        finding += 1;
    }

    let margin_lines: Vec<String> = years
        .iter()
        .filter_map(|&year| {
            let ebitda = table.margin(CanonicalMetric::Ebitda, year);
            let net = table.margin(CanonicalMetric::NetProfit, year);
            match (ebitda, net) {
                (None, None) => None,
                _ => {
                    let e = ebitda.map(|m| format!("EBITDA Margin {m:.2}%"));
                    let n = net.map(|m| format!("Net Margin {m:.2}%"));
                    let parts: Vec<String> = [e, n].into_iter().flatten().collect();
                    Some(format!("   FY {year}: {}", parts.join(" | ")))
                }
            }
        })
        .collect();
    if !margin_lines.is_empty() {
        let _ = writeln!(out, "{finding}. Profitability Trends:");
        for line in margin_lines {
            let _ = writeln!(out, "{line}");
        }
        out.push('\n');
        finding += 1;
    }

    let profit_lines: Vec<String> = years
        .iter()
        .filter_map(|&year| {
            table.value(CanonicalMetric::NetProfit, year).map(|profit| {
                let growth = table
                    .yoy_growth(CanonicalMetric::NetProfit, year)
                    .map(|g| format!(" ({g:+.1}%)"))
                    .unwrap_or_default();
                format!("   - FY {year}: KShs {profit:.0}M{growth}")
            })
        })
        .collect();
    if !profit_lines.is_empty() {
        let _ = writeln!(out, "{finding}. Net Profit Performance:");
        for line in profit_lines {
            let _ = writeln!(out, "{line}");
        }
        out.push('\n');
    }

    // ── Detailed table ───────────────────────────────────────────────────
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "DETAILED FINANCIAL METRICS");
    let _ = writeln!(out, "{RULE}");
    out.push('\n');
    render_metric_grid(&mut out, table);
    out.push('\n');

    // ── Observations ─────────────────────────────────────────────────────
    if let Some(observation) = margin_trend_observation(table) {
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "OBSERVATIONS");
        let _ = writeln!(out, "{RULE}");
        out.push('\n');
        let _ = writeln!(out, "{observation}");
        out.push('\n');
    }

    // ── Methodology ──────────────────────────────────────────────────────
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "METHODOLOGY");
    let _ = writeln!(out, "{RULE}");
    out.push('\n');
    let _ = writeln!(out, "Data Source: annual report PDFs, one per fiscal year ({period})");
    let _ = writeln!(
        out,
        "Extraction Method: automated parsing of the consolidated statement of"
    );
    let _ = writeln!(
        out,
        "comprehensive income; unavailable figures are shown as blanks, never zero"
    );
    out.push('\n');
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "END OF REPORT");
    let _ = writeln!(out, "{RULE}");

    out
}

/// Metric-per-row grid: metrics down the side, years across the top.
fn render_metric_grid(out: &mut String, table: &AggregatedTable) {
    let years = table.years();
    let _ = write!(out, "{:<28}", "Metric (KShs M)");
    for year in &years {
        let _ = write!(out, "{:>14}", format!("FY {year}"));
    }
    out.push('\n');
    for metric in CanonicalMetric::ALL {
        let _ = write!(out, "{:<28}", metric.display_name());
        for &year in &years {
            match table.value(metric, year) {
                Some(v) => {
                    let _ = write!(out, "{:>14}", format!("{v:.1}"));
                }
                None => {
                    let _ = write!(out, "{:>14}", "-");
                }
            }
        }
        out.push('\n');
    }
}

/// One-line net-margin trend direction over the table's span, when both
/// endpoint margins exist.
fn margin_trend_observation(table: &AggregatedTable) -> Option<String> {
    let years = table.years();
    let first = table.margin(CanonicalMetric::NetProfit, *years.first()?)?;
    let last = table.margin(CanonicalMetric::NetProfit, *years.last()?)?;
    let direction = if (last - first).abs() < 0.5 {
        "held steady"
    } else if last > first {
        "improved"
    } else {
        "declined"
    };
    Some(format!(
        "Net margin {direction} over the period: {first:.2}% -> {last:.2}%"
    ))
}

/// Render the report and write it atomically.
pub fn write_report(table: &AggregatedTable, path: &Path) -> Result<(), ExtractError> {
    super::write_atomic(path, &render_report(table))
}
