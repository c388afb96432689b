//! SVG charts for the aggregated table.
//!
//! Four self-contained SVG files, assembled as strings (the corpus carries no
//! chart crate and these are simple enough not to want one):
//!
//! 1. `1_revenue_trend.svg` — revenue line with markers
//! 2. `2_profitability.svg` — grouped bars: EBITDA, operating profit, net profit
//! 3. `3_margins.svg` — margin lines: EBITDA, operating, net
//! 4. `4_growth.svg` — YoY growth bars: revenue, net profit
//!
//! Unavailable values drop the affected point or bar; a chart with nothing to
//! plot is skipped with a warning rather than written empty.

use crate::aggregate::AggregatedTable;
use crate::error::ExtractError;
use crate::metrics::CanonicalMetric;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::warn;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;

const BLUE: &str = "#1971c2";
const GREEN: &str = "#2f9e44";
const ORANGE: &str = "#f08c00";
const RED: &str = "#e03131";

/// Write every renderable chart under `out_dir/charts/`, returning the paths
/// written. Charts with no plottable data are skipped.
pub fn write_charts(table: &AggregatedTable, out_dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let dir = out_dir.join("charts");
    let charts: [(&str, Option<String>); 4] = [
        ("1_revenue_trend.svg", render_revenue_trend(table)),
        ("2_profitability.svg", render_profitability(table)),
        ("3_margins.svg", render_margins(table)),
        ("4_growth.svg", render_growth(table)),
    ];

    let mut written = Vec::new();
    for (name, svg) in charts {
        match svg {
            Some(svg) => {
                let path = dir.join(name);
                super::write_atomic(&path, &svg)?;
                written.push(path);
            }
            None => warn!(chart = name, "no plottable data, chart skipped"),
        }
    }
    Ok(written)
}

/// Revenue line+marker series across years.
pub fn render_revenue_trend(table: &AggregatedTable) -> Option<String> {
    let series = year_series(table, CanonicalMetric::TotalRevenue);
    if series.iter().filter(|(_, v)| v.is_some()).count() < 1 {
        return None;
    }
    let plot = Plot::fit(&[&series])?;
    let mut svg = plot.begin("Total Revenue (KShs M)", &years_of(&series));
    plot.line_series(&mut svg, &series, GREEN);
    svg.push_str(&plot.finish());
    Some(svg)
}

/// Grouped profitability bars per year.
pub fn render_profitability(table: &AggregatedTable) -> Option<String> {
    let groups = [
        (CanonicalMetric::Ebitda, BLUE),
        (CanonicalMetric::OperatingProfit, ORANGE),
        (CanonicalMetric::NetProfit, RED),
    ];
    let all: Vec<Vec<(u16, Option<f64>)>> = groups
        .iter()
        .map(|(m, _)| year_series(table, *m))
        .collect();
    let refs: Vec<&[(u16, Option<f64>)]> = all.iter().map(Vec::as_slice).collect();
    let plot = Plot::fit(&refs)?;
    let mut svg = plot.begin("Profitability (KShs M)", &years_of(&all[0]));
    for (slot, ((metric, color), series)) in groups.iter().zip(&all).enumerate() {
        plot.bar_series(&mut svg, series, slot, groups.len(), color);
        plot.legend(&mut svg, slot, metric.display_name(), color);
    }
    svg.push_str(&plot.finish());
    Some(svg)
}

/// Margin lines per year, in percent.
pub fn render_margins(table: &AggregatedTable) -> Option<String> {
    let metrics = [
        (CanonicalMetric::Ebitda, "EBITDA Margin", BLUE),
        (CanonicalMetric::OperatingProfit, "Operating Margin", ORANGE),
        (CanonicalMetric::NetProfit, "Net Margin", RED),
    ];
    let all: Vec<Vec<(u16, Option<f64>)>> = metrics
        .iter()
        .map(|(m, _, _)| {
            table
                .years()
                .into_iter()
                .map(|y| (y, table.margin(*m, y)))
                .collect()
        })
        .collect();
    let refs: Vec<&[(u16, Option<f64>)]> = all.iter().map(Vec::as_slice).collect();
    let plot = Plot::fit(&refs)?;
    let mut svg = plot.begin("Margins (%)", &years_of(&all[0]));
    for (slot, ((_, label, color), series)) in metrics.iter().zip(&all).enumerate() {
        plot.line_series(&mut svg, series, color);
        plot.legend(&mut svg, slot, label, color);
    }
    svg.push_str(&plot.finish());
    Some(svg)
}

/// YoY growth bars (revenue, net profit) per year.
pub fn render_growth(table: &AggregatedTable) -> Option<String> {
    let metrics = [
        (CanonicalMetric::TotalRevenue, "Revenue Growth", GREEN),
        (CanonicalMetric::NetProfit, "Net Profit Growth", RED),
    ];
    let all: Vec<Vec<(u16, Option<f64>)>> = metrics
        .iter()
        .map(|(m, _, _)| {
            table
                .years()
                .into_iter()
                .map(|y| (y, table.yoy_growth(*m, y)))
                .collect()
        })
        .collect();
    let refs: Vec<&[(u16, Option<f64>)]> = all.iter().map(Vec::as_slice).collect();
    let plot = Plot::fit(&refs)?;
    let mut svg = plot.begin("Year-over-Year Growth (%)", &years_of(&all[0]));
    for (slot, ((_, label, color), series)) in metrics.iter().zip(&all).enumerate() {
        plot.bar_series(&mut svg, series, slot, metrics.len(), color);
        plot.legend(&mut svg, slot, label, color);
    }
    svg.push_str(&plot.finish());
    Some(svg)
}

// ── Shared plotting scaffold ─────────────────────────────────────────────

type Series = [(u16, Option<f64>)];

fn year_series(table: &AggregatedTable, metric: CanonicalMetric) -> Vec<(u16, Option<f64>)> {
    table
        .years()
        .into_iter()
        .map(|y| (y, table.value(metric, y)))
        .collect()
}

fn years_of(series: &Series) -> Vec<u16> {
    series.iter().map(|(y, _)| *y).collect()
}

/// Axis frame and coordinate scaling for one chart.
struct Plot {
    slots: usize,
    y_min: f64,
    y_max: f64,
}

impl Plot {
    /// Fit a frame around every present value across the given series.
    /// `None` when nothing is present to plot.
    fn fit(series: &[&Series]) -> Option<Plot> {
        let values: Vec<f64> = series
            .iter()
            .flat_map(|s| s.iter().filter_map(|(_, v)| *v))
            .collect();
        if values.is_empty() {
            return None;
        }
        let slots = series.iter().map(|s| s.len()).max()?;
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min).min(0.0);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max).max(0.0);
        let pad = ((hi - lo) * 0.1).max(1.0);
        Some(Plot {
            slots,
            y_min: if lo < 0.0 { lo - pad } else { lo },
            y_max: hi + pad,
        })
    }

    fn x(&self, slot: usize) -> f64 {
        let span = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        MARGIN_LEFT + span * (slot as f64 + 0.5) / self.slots as f64
    }

    fn y(&self, value: f64) -> f64 {
        let span = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        HEIGHT - MARGIN_BOTTOM - span * (value - self.y_min) / (self.y_max - self.y_min)
    }

    /// SVG preamble: background, title, y gridlines with labels, x labels.
    fn begin(&self, title: &str, years: &[u16]) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
             viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\">\n\
             <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"white\"/>\n\
             <text x=\"{tx}\" y=\"28\" font-size=\"16\" font-weight=\"bold\" \
             text-anchor=\"middle\">{title}</text>\n",
            tx = WIDTH / 2.0,
        );

        // Horizontal gridlines at 5 divisions.
        for i in 0..=5 {
            let value = self.y_min + (self.y_max - self.y_min) * f64::from(i) / 5.0;
            let y = self.y(value);
            let _ = writeln!(
                svg,
                "<line x1=\"{MARGIN_LEFT}\" y1=\"{y:.1}\" x2=\"{x2}\" y2=\"{y:.1}\" \
                 stroke=\"#dee2e6\"/>\n\
                 <text x=\"{lx}\" y=\"{ly:.1}\" font-size=\"11\" text-anchor=\"end\" \
                 fill=\"#495057\">{value:.0}</text>",
                x2 = WIDTH - MARGIN_RIGHT,
                lx = MARGIN_LEFT - 8.0,
                ly = y + 4.0,
            );
        }

        // Zero axis, emphasised when negatives are in frame.
        if self.y_min < 0.0 {
            let y0 = self.y(0.0);
            let _ = writeln!(
                svg,
                "<line x1=\"{MARGIN_LEFT}\" y1=\"{y0:.1}\" x2=\"{x2}\" y2=\"{y0:.1}\" \
                 stroke=\"#868e96\"/>",
                x2 = WIDTH - MARGIN_RIGHT,
            );
        }

        // X labels.
        for (slot, year) in years.iter().enumerate() {
            let _ = writeln!(
                svg,
                "<text x=\"{x:.1}\" y=\"{y}\" font-size=\"12\" text-anchor=\"middle\" \
                 fill=\"#212529\">FY {year}</text>",
                x = self.x(slot),
                y = HEIGHT - MARGIN_BOTTOM + 20.0,
            );
        }
        svg
    }

    /// Polyline through present points, with circle markers. Gaps break the
    /// line rather than interpolating across missing years.
    fn line_series(&self, svg: &mut String, series: &Series, color: &str) {
        let mut segment: Vec<(f64, f64)> = Vec::new();
        let flush = |svg: &mut String, segment: &mut Vec<(f64, f64)>| {
            if segment.len() >= 2 {
                let points: Vec<String> = segment
                    .iter()
                    .map(|(x, y)| format!("{x:.1},{y:.1}"))
                    .collect();
                let _ = writeln!(
                    svg,
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" \
                     stroke-width=\"2.5\"/>",
                    points.join(" "),
                );
            }
            segment.clear();
        };

        for (slot, (_, value)) in series.iter().enumerate() {
            match value {
                Some(v) => segment.push((self.x(slot), self.y(*v))),
                None => flush(svg, &mut segment),
            }
        }
        flush(svg, &mut segment);

        for (slot, (_, value)) in series.iter().enumerate() {
            if let Some(v) = value {
                let _ = writeln!(
                    svg,
                    "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"4\" fill=\"{color}\"/>",
                    x = self.x(slot),
                    y = self.y(*v),
                );
            }
        }
    }

    /// One bar per present value, positioned within a group of `group_size`.
    fn bar_series(
        &self,
        svg: &mut String,
        series: &Series,
        group_slot: usize,
        group_size: usize,
        color: &str,
    ) {
        let slot_width = (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / self.slots as f64;
        let bar_width = (slot_width * 0.7) / group_size as f64;
        let y0 = self.y(0.0_f64.max(self.y_min));

        for (slot, (_, value)) in series.iter().enumerate() {
            let Some(v) = value else { continue };
            let x = self.x(slot) - (slot_width * 0.35)
                + bar_width * group_slot as f64;
            let yv = self.y(*v);
            let (top, height) = if yv <= y0 { (yv, y0 - yv) } else { (y0, yv - y0) };
            let _ = writeln!(
                svg,
                "<rect x=\"{x:.1}\" y=\"{top:.1}\" width=\"{w:.1}\" height=\"{height:.1}\" \
                 fill=\"{color}\"/>",
                w = bar_width - 2.0,
            );
        }
    }

    /// Legend swatch + label in the top-right corner, one row per slot.
    fn legend(&self, svg: &mut String, slot: usize, label: &str, color: &str) {
        let x = WIDTH - MARGIN_RIGHT - 160.0;
        let y = MARGIN_TOP + 16.0 * slot as f64;
        let _ = writeln!(
            svg,
            "<rect x=\"{x}\" y=\"{ry}\" width=\"12\" height=\"12\" fill=\"{color}\"/>\n\
             <text x=\"{tx}\" y=\"{ty}\" font-size=\"11\" fill=\"#212529\">{label}</text>",
            ry = y - 10.0,
            tx = x + 18.0,
            ty = y,
        );
    }

    fn finish(&self) -> String {
        "</svg>\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FiscalRecord;

    fn table() -> AggregatedTable {
        let rows = [
            (2023, 352_301.0, 176_153.0, 160_000.0, 62_271.0),
            (2024, 395_926.0, 199_530.0, 175_000.0, 42_663.0),
            (2025, 440_305.0, 225_085.0, 190_000.0, 45_761.0),
        ];
        AggregatedTable::from_records(rows.map(|(year, rev, ebitda, op, net)| {
            let mut r = FiscalRecord::empty(year);
            r.set(CanonicalMetric::TotalRevenue, rev);
            r.set(CanonicalMetric::Ebitda, ebitda);
            r.set(CanonicalMetric::OperatingProfit, op);
            r.set(CanonicalMetric::NetProfit, net);
            r
        }))
    }

    #[test]
    fn revenue_trend_plots_all_years() {
        let svg = render_revenue_trend(&table()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("FY 2023") && svg.contains("FY 2025"));
    }

    #[test]
    fn missing_year_drops_the_marker_and_breaks_the_line() {
        let mut t = table();
        let mut gap = FiscalRecord::empty(2026);
        gap.set(CanonicalMetric::Ebitda, 230_000.0);
        t.insert(gap);
        let svg = render_revenue_trend(&t).unwrap();
        // Three markers, not four: 2026 has no revenue.
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn profitability_renders_grouped_bars_with_legend() {
        let svg = render_profitability(&table()).unwrap();
        // 3 metrics x 3 years of bars, plus 3 legend swatches.
        assert_eq!(svg.matches("<rect").count(), 1 + 9 + 3);
        assert!(svg.contains("EBITDA"));
        assert!(svg.contains("Net Profit"));
    }

    #[test]
    fn growth_chart_skips_the_first_year() {
        let svg = render_growth(&table()).unwrap();
        // 2 metrics x 2 year-pairs, background rect, 2 legend swatches.
        assert_eq!(svg.matches("<rect").count(), 1 + 4 + 2);
    }

    #[test]
    fn empty_table_yields_no_charts() {
        let empty = AggregatedTable::new();
        assert!(render_revenue_trend(&empty).is_none());
        assert!(render_profitability(&empty).is_none());
        assert!(render_margins(&empty).is_none());
        assert!(render_growth(&empty).is_none());
    }

    #[test]
    fn write_charts_writes_only_renderable_files() {
        let dir = tempfile::tempdir().unwrap();
        // Revenue only: trend + margins-less charts mostly skipped.
        let mut r = FiscalRecord::empty(2024);
        r.set(CanonicalMetric::TotalRevenue, 395_926.0);
        let t = AggregatedTable::from_records([r]);
        let written = write_charts(&t, dir.path()).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.contains(&"1_revenue_trend.svg".to_string()));
        assert!(!names.contains(&"2_profitability.svg".to_string()));
        assert!(!names.contains(&"4_growth.svg".to_string()));
        for path in &written {
            assert!(path.exists());
        }
    }
}
