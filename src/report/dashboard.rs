//! Static HTML dashboard.
//!
//! One self-contained file the operator opens in a browser: headline cards
//! for the latest year, the full metrics table, and the four SVG charts
//! inlined. No server and no JavaScript; a long-running dashboard service is
//! out of scope, a file is not.

use crate::aggregate::AggregatedTable;
use crate::error::ExtractError;
use crate::metrics::CanonicalMetric;
use crate::report::chart;
use chrono::Local;
use std::fmt::Write as _;
use std::path::Path;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 0; background: #f1f3f5; color: #212529; }\n\
header { background: #212529; color: white; padding: 20px 32px; }\n\
header h1 { margin: 0; font-size: 22px; }\n\
header p { margin: 4px 0 0; color: #adb5bd; font-size: 13px; }\n\
main { max-width: 1080px; margin: 0 auto; padding: 24px 32px; }\n\
.cards { display: flex; gap: 16px; flex-wrap: wrap; }\n\
.card { background: white; border-radius: 8px; padding: 16px 20px; flex: 1; min-width: 180px; }\n\
.card .label { font-size: 12px; color: #868e96; text-transform: uppercase; }\n\
.card .value { font-size: 24px; font-weight: bold; margin-top: 4px; }\n\
.card .delta { font-size: 13px; margin-top: 2px; }\n\
.up { color: #2f9e44; } .down { color: #e03131; }\n\
section { margin-top: 28px; }\n\
table { border-collapse: collapse; width: 100%; background: white; border-radius: 8px; }\n\
th, td { padding: 8px 12px; text-align: right; border-bottom: 1px solid #dee2e6; font-size: 13px; }\n\
th:first-child, td:first-child { text-align: left; }\n\
th { background: #343a40; color: white; }\n\
.chart { background: white; border-radius: 8px; padding: 12px; margin-top: 16px; }\n";

/// Render the dashboard HTML.
pub fn render_dashboard(table: &AggregatedTable) -> String {
    let mut html = String::new();
    let years = table.years();
    let period = match (years.first(), years.last()) {
        (Some(f), Some(l)) if f != l => format!("FY {f} - FY {l}"),
        (Some(o), _) => format!("FY {o}"),
        _ => "no data".to_string(),
    };

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Financial Dashboard ({period})</title>\n<style>\n{STYLE}</style>\n</head>\n\
         <body>\n<header>\n<h1>Financial Analysis Dashboard</h1>\n\
         <p>{period} &middot; KShs millions &middot; generated {date}</p>\n</header>\n<main>\n",
        date = Local::now().format("%Y-%m-%d"),
    );

    // ── Headline cards (latest year) ─────────────────────────────────────
    if let Some(&latest) = years.last() {
        html.push_str("<section class=\"cards\">\n");
        headline_card(
            &mut html,
            table,
            latest,
            CanonicalMetric::TotalRevenue,
            "Revenue",
        );
        headline_card(&mut html, table, latest, CanonicalMetric::Ebitda, "EBITDA");
        headline_card(
            &mut html,
            table,
            latest,
            CanonicalMetric::NetProfit,
            "Net Profit",
        );
        if let Some(margin) = table.margin(CanonicalMetric::NetProfit, latest) {
            let _ = write!(
                html,
                "<div class=\"card\"><div class=\"label\">Net Margin FY {latest}</div>\
                 <div class=\"value\">{margin:.2}%</div></div>\n"
            );
        }
        html.push_str("</section>\n");
    }

    // ── Metrics table ────────────────────────────────────────────────────
    html.push_str("<section>\n<table>\n<tr><th>Metric (KShs M)</th>");
    for year in &years {
        let _ = write!(html, "<th>FY {year}</th>");
    }
    html.push_str("</tr>\n");
    for metric in CanonicalMetric::ALL {
        let _ = write!(html, "<tr><td>{}</td>", metric.display_name());
        for &year in &years {
            match table.value(metric, year) {
                Some(v) => {
                    let _ = write!(html, "<td>{v:.1}</td>");
                }
                None => html.push_str("<td>&ndash;</td>"),
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</section>\n");

    // ── Charts, inlined ──────────────────────────────────────────────────
    let charts = [
        chart::render_revenue_trend(table),
        chart::render_profitability(table),
        chart::render_margins(table),
        chart::render_growth(table),
    ];
    for svg in charts.into_iter().flatten() {
        let _ = write!(html, "<section class=\"chart\">\n{svg}</section>\n");
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// One headline card: value for the latest year plus YoY delta when present.
/// Omitted entirely when the metric is unavailable.
fn headline_card(
    html: &mut String,
    table: &AggregatedTable,
    year: u16,
    metric: CanonicalMetric,
    label: &str,
) {
    let Some(value) = table.value(metric, year) else {
        return;
    };
    let _ = write!(
        html,
        "<div class=\"card\"><div class=\"label\">{label} FY {year}</div>\
         <div class=\"value\">{value:.0}M</div>"
    );
    if let Some(growth) = table.yoy_growth(metric, year) {
        let class = if growth >= 0.0 { "up" } else { "down" };
        let _ = write!(
            html,
            "<div class=\"delta {class}\">{growth:+.1}% YoY</div>"
        );
    }
    html.push_str("</div>\n");
}

/// Render the dashboard and write it atomically.
pub fn write_dashboard(table: &AggregatedTable, path: &Path) -> Result<(), ExtractError> {
    super::write_atomic(path, &render_dashboard(table))
}
