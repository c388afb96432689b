//! CLI binary for pdf2fin.
//!
//! A thin shim over the library crate that maps subcommands to config and
//! prints results. Exit codes: 0 success, 1 fatal error, 2 batch completed
//! but at least one document failed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2fin::report::{chart, dashboard, table, text};
use pdf2fin::{
    inspect, pipeline, run_batch_to_files, BatchOutput, BatchProgressCallback, ExtractionConfig,
    ProgressCallback, StatementKind,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar across the document batch, a log line per
/// completed document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:36.green/238}] {pos}/{len} documents  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, fiscal_year: u16, _index: usize, _total: usize) {
        self.bar.set_message(format!("FY{fiscal_year}"));
    }

    fn on_document_complete(&self, fiscal_year: u16, found: usize, missing: usize) {
        let gaps = if missing == 0 {
            String::new()
        } else {
            format!("  {}", dim(&format!("{missing} missing")))
        };
        self.bar.println(format!(
            "  {} FY{fiscal_year}  {found}/{} metrics{gaps}",
            green("✓"),
            found + missing,
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, fiscal_year: u16, error: &str) {
        self.bar
            .println(format!("  {} FY{fiscal_year}  {}", red("✗"), red(error)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _extracted: usize, _failed: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the batch from a manifest, writing CSVs to data/processed/
  pdf2fin extract --manifest documents.json

  # Same, plus raw page dumps and machine-readable output
  pdf2fin extract --manifest documents.json --dump-pages --json

  # Where is each statement? (page hints from the manifest)
  pdf2fin locate --manifest documents.json --statement income

  # Scan one PDF for every known statement, no hints
  pdf2fin inspect reports/annual_2025.pdf

  # Render reports from a previously written table
  pdf2fin report --table data/processed/multi_year_analysis.csv
  pdf2fin chart --table data/processed/multi_year_analysis.csv --out-dir data/processed
  pdf2fin dashboard --table data/processed/multi_year_analysis.csv --out dashboard.html

MANIFEST FORMAT (JSON array, one entry per fiscal year):
  [
    { "path": "reports/annual_2023.pdf", "fiscal_year": 2023,
      "page_hints": { "comprehensive_income": 188 } },
    { "path": "reports/annual_2024.pdf", "fiscal_year": 2024,
      "page_hints": { "comprehensive_income": 181 } }
  ]

EXIT CODES:
  0  success
  1  fatal error (bad manifest, unwritable output, ...)
  2  batch completed but at least one document failed

ENVIRONMENT VARIABLES:
  RUST_LOG   tracing filter, overrides --verbose/--quiet (e.g. pdf2fin=debug)
"#;

/// Extract financial statement metrics from annual-report PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2fin",
    version,
    about = "Extract financial statement metrics from annual-report PDFs",
    long_about = "Extract income-statement metrics (revenue, EBITDA, operating profit, net \
profit, ...) from a set of annual-report PDFs, one per fiscal year, into multi-year CSV \
tables, a text report, SVG charts, and a static HTML dashboard.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2FIN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2FIN_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batch: extract every manifest document and write both CSVs.
    Extract {
        /// JSON document manifest.
        #[arg(long, env = "PDF2FIN_MANIFEST")]
        manifest: PathBuf,

        /// Output directory for tables and page dumps.
        #[arg(long, default_value = "data/processed", env = "PDF2FIN_OUT_DIR")]
        out_dir: PathBuf,

        /// Pages scanned on each side of a page hint.
        #[arg(long, default_value_t = 10)]
        search_radius: usize,

        /// Dump each located statement page's raw text under <out-dir>/pages/.
        #[arg(long)]
        dump_pages: bool,

        /// Emit the full batch outcome as JSON instead of the summary table.
        #[arg(long)]
        json: bool,

        /// Disable the progress bar.
        #[arg(long)]
        no_progress: bool,
    },

    /// Run only the locator and print located pages per document.
    Locate {
        /// JSON document manifest.
        #[arg(long, env = "PDF2FIN_MANIFEST")]
        manifest: PathBuf,

        /// Restrict to one statement: income, position, or cash.
        #[arg(long)]
        statement: Option<String>,

        /// Pages scanned on each side of a page hint.
        #[arg(long, default_value_t = 10)]
        search_radius: usize,
    },

    /// Scan one PDF for every known statement, whole document, no hints.
    Inspect {
        /// PDF file to inspect.
        pdf: PathBuf,

        /// Emit JSON instead of the table.
        #[arg(long)]
        json: bool,
    },

    /// Render the plain-text analysis report from a metrics table.
    Report {
        /// Previously written metrics CSV (summary or analysis file).
        #[arg(long)]
        table: PathBuf,

        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write the SVG charts from a metrics table.
    Chart {
        /// Previously written metrics CSV (summary or analysis file).
        #[arg(long)]
        table: PathBuf,

        /// Directory receiving <out-dir>/charts/.
        #[arg(long, default_value = "data/processed")]
        out_dir: PathBuf,
    },

    /// Write the static HTML dashboard from a metrics table.
    Dashboard {
        /// Previously written metrics CSV (summary or analysis file).
        #[arg(long)]
        table: PathBuf,

        /// Output HTML file.
        #[arg(long, default_value = "dashboard.html")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let flags = Flags { quiet: cli.quiet };
    let exit_code = match cli.command {
        Command::Extract {
            manifest,
            out_dir,
            search_radius,
            dump_pages,
            json,
            no_progress,
        } => cmd_extract(
            &flags,
            &manifest,
            out_dir,
            search_radius,
            dump_pages,
            json,
            no_progress,
        )?,
        Command::Locate {
            manifest,
            statement,
            search_radius,
        } => cmd_locate(&manifest, statement.as_deref(), search_radius)?,
        Command::Inspect { pdf, json } => cmd_inspect(&pdf, json)?,
        Command::Report { table, out } => cmd_report(&table, out.as_deref())?,
        Command::Chart { table, out_dir } => cmd_chart(&table, &out_dir)?,
        Command::Dashboard { table, out } => cmd_dashboard(&table, &out)?,
    };

    std::process::exit(exit_code);
}

struct Flags {
    quiet: bool,
}

#[allow(clippy::too_many_arguments)]
fn cmd_extract(
    flags: &Flags,
    manifest: &PathBuf,
    out_dir: PathBuf,
    search_radius: usize,
    dump_pages: bool,
    json: bool,
    no_progress: bool,
) -> Result<i32> {
    let base = ExtractionConfig::from_manifest(manifest).context("Failed to load manifest")?;

    let show_progress = !flags.quiet && !no_progress && !json;
    let mut builder = ExtractionConfig::builder()
        .documents(base.documents)
        .out_dir(out_dir)
        .search_radius(search_radius)
        .dump_pages(dump_pages);
    if show_progress {
        builder = builder
            .progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    let output = run_batch_to_files(&config).context("Extraction failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !flags.quiet {
        print_batch_summary(&output, &config);
    }

    Ok(if output.stats.documents_failed > 0 { 2 } else { 0 })
}

/// Per-document summary table plus the output file locations.
fn print_batch_summary(output: &BatchOutput, config: &ExtractionConfig) {
    println!();
    println!(
        "{}",
        bold(&format!(
            "  {:<8} {:>6} {:>14} {:>9}  {}",
            "Year", "Page", "Metrics", "Time", "Status"
        ))
    );
    for doc in &output.documents {
        let page = doc
            .located_page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".into());
        let status = match &doc.error {
            None => green("ok"),
            Some(e) => red(&e.to_string()),
        };
        println!(
            "  {:<8} {:>6} {:>14} {:>9}  {}",
            format!("FY{}", doc.fiscal_year),
            page,
            format!("{}/{}", doc.record.found(), doc.record.found() + doc.record.missing()),
            format!("{}ms", doc.elapsed_ms),
            status,
        );
    }
    println!();

    let s = &output.stats;
    let tick = if s.documents_failed == 0 {
        green("✔")
    } else {
        cyan("⚠")
    };
    println!(
        "{tick} {}/{} documents, {} metrics found, {} missing  {}",
        s.documents_extracted,
        s.documents_total,
        s.metrics_found,
        s.metrics_missing,
        dim(&format!("{}ms", s.total_duration_ms)),
    );
    println!(
        "  → {}",
        bold(&config.out_dir.join(table::SUMMARY_FILE).display().to_string())
    );
    println!(
        "  → {}",
        bold(&config.out_dir.join(table::ANALYSIS_FILE).display().to_string())
    );
}

fn cmd_locate(manifest: &PathBuf, statement: Option<&str>, search_radius: usize) -> Result<i32> {
    let config = ExtractionConfig::from_manifest(manifest).context("Failed to load manifest")?;
    let kinds: Vec<StatementKind> = match statement {
        Some(name) => vec![StatementKind::parse(name)
            .with_context(|| format!("Unknown statement kind: '{name}'"))?],
        None => StatementKind::ALL.to_vec(),
    };

    let mut missing = false;
    for doc in &config.documents {
        println!("{}  FY{}", bold(&doc.path.display().to_string()), doc.fiscal_year);
        let pages = match pipeline::input::validate_pdf(&doc.path)
            .and_then(|p| pipeline::pages::extract_pages(&p))
        {
            Ok(pages) => pages,
            Err(e) => {
                println!("  {} {e}", red("✗"));
                missing = true;
                continue;
            }
        };
        for &kind in &kinds {
            match pipeline::locate::locate_statement(&pages, kind, doc.hint(kind), search_radius)
            {
                Ok(found) => println!("  {} {kind}: page {}", green("✓"), found.page),
                Err(window) => {
                    println!(
                        "  {} {kind}: not found (searched pages {}-{})",
                        red("✗"),
                        window.first,
                        window.last
                    );
                    missing = true;
                }
            }
        }
    }
    Ok(if missing { 2 } else { 0 })
}

fn cmd_inspect(pdf: &PathBuf, json: bool) -> Result<i32> {
    let report = inspect(pdf).context("Failed to inspect PDF")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else {
        println!("File:   {}", pdf.display());
        println!("Pages:  {}", report.page_count);
        for (kind, page) in &report.statements {
            match page {
                Some(p) => println!("  {} {kind}: page {p}", green("✓")),
                None => println!("  {} {kind}: not found", dim("-")),
            }
        }
    }
    Ok(0)
}

fn cmd_report(table_path: &PathBuf, out: Option<&std::path::Path>) -> Result<i32> {
    let table = table::read_table(table_path).context("Failed to read metrics table")?;
    match out {
        Some(path) => {
            text::write_report(&table, path).context("Failed to write report")?;
            eprintln!("{} wrote {}", green("✔"), bold(&path.display().to_string()));
        }
        None => {
            let report = text::render_report(&table);
            io::stdout()
                .write_all(report.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(0)
}

fn cmd_chart(table_path: &PathBuf, out_dir: &std::path::Path) -> Result<i32> {
    let table = table::read_table(table_path).context("Failed to read metrics table")?;
    let written = chart::write_charts(&table, out_dir).context("Failed to write charts")?;
    if written.is_empty() {
        eprintln!("{} no chart had plottable data", cyan("⚠"));
        return Ok(0);
    }
    for path in &written {
        eprintln!("{} wrote {}", green("✔"), bold(&path.display().to_string()));
    }
    Ok(0)
}

fn cmd_dashboard(table_path: &PathBuf, out: &std::path::Path) -> Result<i32> {
    let table = table::read_table(table_path).context("Failed to read metrics table")?;
    dashboard::write_dashboard(&table, out).context("Failed to write dashboard")?;
    eprintln!("{} wrote {}", green("✔"), bold(&out.display().to_string()));
    Ok(0)
}
