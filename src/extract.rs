//! Extraction entry points: the per-document pass and the batch driver.
//!
//! [`extract_document`] runs one PDF through the staged pipeline and always
//! returns a [`DocumentResult`]: a document that cannot be read yields a
//! fully-unavailable record carrying a [`DocumentError`], so one bad report
//! never sinks the batch. [`run_batch`] drives the whole manifest and merges
//! the records into an [`AggregatedTable`]; [`run_batch_to_files`]
//! additionally writes the two flat tables to the configured output
//! directory.

use crate::aggregate::AggregatedTable;
use crate::config::{DocumentSpec, ExtractionConfig, StatementKind};
use crate::error::ExtractError;
use crate::metrics::CanonicalMetric;
use crate::output::{BatchOutput, BatchStats, DocumentResult, FiscalRecord};
use crate::pipeline::{classify, input, locate, pages, rows};
use crate::report::table;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Extract one document's metrics.
///
/// Never returns `Err` for problems with the document itself; those are
/// downgraded into `result.error` and a fully-unavailable record, per the
/// batch-continues policy.
pub fn extract_document(doc: &DocumentSpec, config: &ExtractionConfig) -> DocumentResult {
    let start = Instant::now();
    info!(fiscal_year = doc.fiscal_year, path = %doc.path.display(), "extracting document");

    match extract_inner(doc, config) {
        Ok((page, record)) => {
            for metric in CanonicalMetric::ALL {
                if record.get(metric).is_none() {
                    warn!(
                        fiscal_year = doc.fiscal_year,
                        metric = %metric,
                        "metric unavailable for this year"
                    );
                }
            }
            info!(
                fiscal_year = doc.fiscal_year,
                page,
                found = record.found(),
                missing = record.missing(),
                "document extracted"
            );
            DocumentResult {
                fiscal_year: doc.fiscal_year,
                source: doc.path.clone(),
                located_page: Some(page),
                record,
                elapsed_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            error!(fiscal_year = doc.fiscal_year, error = %e, "document aborted");
            DocumentResult {
                fiscal_year: doc.fiscal_year,
                source: doc.path.clone(),
                located_page: None,
                record: FiscalRecord::empty(doc.fiscal_year),
                elapsed_ms: start.elapsed().as_millis() as u64,
                error: Some(e.to_document_error(doc.fiscal_year)),
            }
        }
    }
}

fn extract_inner(
    doc: &DocumentSpec,
    config: &ExtractionConfig,
) -> Result<(usize, FiscalRecord), ExtractError> {
    // ── Step 1: Validate input ───────────────────────────────────────────
    let path = input::validate_pdf(&doc.path)?;

    // ── Step 2: Extract page text ────────────────────────────────────────
    let page_texts = pages::extract_pages(&path)?;

    // ── Step 3: Locate the income statement ──────────────────────────────
    let statement = StatementKind::ComprehensiveIncome;
    let located = locate::locate_statement(
        &page_texts,
        statement,
        doc.hint(statement),
        config.search_radius,
    )
    .map_err(|window| ExtractError::StatementNotFound {
        path: path.clone(),
        statement,
        first: window.first,
        last: window.last,
    })?;
    let page_text = &page_texts[located.page - 1];

    if config.dump_pages {
        dump_page(config, doc.fiscal_year, statement, page_text)?;
    }

    // ── Step 4: Rows + classification ────────────────────────────────────
    let raw_rows = rows::build_rows(page_text, config.lookahead);
    let acc = classify::scan_rows(&config.rules, &raw_rows);

    let mut record = FiscalRecord::empty(doc.fiscal_year);
    for (metric, value) in acc.into_values() {
        record.set(metric, value);
    }
    Ok((located.page, record))
}

/// Save a located page's raw text for manual inspection.
fn dump_page(
    config: &ExtractionConfig,
    fiscal_year: u16,
    statement: StatementKind,
    text: &str,
) -> Result<(), ExtractError> {
    let path = config
        .out_dir
        .join("pages")
        .join(format!("fy{fiscal_year}_{}.txt", statement.slug()));
    crate::report::write_atomic(&path, text)?;
    info!(path = %path.display(), "dumped statement page");
    Ok(())
}

/// Run the whole manifest: extract every document, merge the records.
///
/// Per-document failures are recorded, not propagated; check
/// `output.stats.documents_failed` or call [`BatchOutput::into_result`].
pub fn run_batch(config: &ExtractionConfig) -> Result<BatchOutput, ExtractError> {
    let start = Instant::now();
    let total = config.documents.len();
    info!(documents = total, "starting batch extraction");

    if let Some(ref cb) = config.progress {
        cb.on_batch_start(total);
    }

    let mut documents = Vec::with_capacity(total);
    let mut table = AggregatedTable::new();

    for (index, doc) in config.documents.iter().enumerate() {
        if let Some(ref cb) = config.progress {
            cb.on_document_start(doc.fiscal_year, index, total);
        }

        let result = extract_document(doc, config);

        if let Some(ref cb) = config.progress {
            match &result.error {
                None => cb.on_document_complete(
                    result.fiscal_year,
                    result.record.found(),
                    result.record.missing(),
                ),
                Some(e) => cb.on_document_error(result.fiscal_year, &e.to_string()),
            }
        }

        table.insert(result.record.clone());
        documents.push(result);
    }

    let extracted = documents.iter().filter(|d| d.succeeded()).count();
    let failed = documents.len() - extracted;
    let stats = BatchStats {
        documents_total: total,
        documents_extracted: extracted,
        documents_failed: failed,
        metrics_found: documents.iter().map(|d| d.record.found()).sum(),
        metrics_missing: documents.iter().map(|d| d.record.missing()).sum(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    if let Some(ref cb) = config.progress {
        cb.on_batch_complete(extracted, failed);
    }
    info!(
        extracted,
        failed,
        duration_ms = stats.total_duration_ms,
        "batch complete"
    );

    Ok(BatchOutput {
        documents,
        table,
        stats,
    })
}

/// Run the batch and write both flat tables under `config.out_dir`.
///
/// Writes `income_statement_summary.csv` (per-year metrics) and
/// `multi_year_analysis.csv` (metrics plus derived columns), each atomically.
pub fn run_batch_to_files(config: &ExtractionConfig) -> Result<BatchOutput, ExtractError> {
    let output = run_batch(config)?;

    let summary_path = config.out_dir.join(table::SUMMARY_FILE);
    table::write_summary(&output.table, &summary_path)?;
    info!(path = %summary_path.display(), "wrote per-year metrics table");

    let analysis_path = config.out_dir.join(table::ANALYSIS_FILE);
    table::write_analysis(&output.table, &analysis_path)?;
    info!(path = %analysis_path.display(), "wrote multi-year analysis table");

    Ok(output)
}

/// Where each statement sits in one document, for `inspect`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InspectReport {
    /// Total page count.
    pub page_count: usize,
    /// Located 1-based page per statement kind; `None` when not found.
    pub statements: Vec<(StatementKind, Option<usize>)>,
}

/// Scan one PDF for every known statement, no hints, whole document.
pub fn inspect(path: impl AsRef<Path>) -> Result<InspectReport, ExtractError> {
    let path = input::validate_pdf(path.as_ref())?;
    let page_texts = pages::extract_pages(&path)?;

    let statements = StatementKind::ALL
        .iter()
        .map(|&kind| {
            let located = locate::locate_statement(&page_texts, kind, None, 0)
                .ok()
                .map(|l| l.page);
            (kind, located)
        })
        .collect();

    Ok(InspectReport {
        page_count: page_texts.len(),
        statements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;

    fn config_for(path: &Path, year: u16) -> ExtractionConfig {
        ExtractionConfig::builder()
            .document(DocumentSpec::new(path, year))
            .build()
            .unwrap()
    }

    #[test]
    fn unreadable_document_yields_empty_record_not_error() {
        let config = config_for(Path::new("/nonexistent/annual_2024.pdf"), 2024);
        let result = extract_document(&config.documents[0], &config);
        assert!(!result.succeeded());
        assert!(result.record.is_empty());
        assert_eq!(result.located_page, None);
        assert_eq!(result.fiscal_year, 2024);
    }

    #[test]
    fn batch_continues_past_a_bad_document() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("annual_2023.pdf");
        std::fs::write(&bad, b"not a pdf at all").unwrap();

        let config = ExtractionConfig::builder()
            .document(DocumentSpec::new(&bad, 2023))
            .document(DocumentSpec::new("/nonexistent/annual_2024.pdf", 2024))
            .out_dir(dir.path().join("out"))
            .build()
            .unwrap();

        let output = run_batch(&config).unwrap();
        assert_eq!(output.stats.documents_total, 2);
        assert_eq!(output.stats.documents_failed, 2);
        // Both years still present as fully-unavailable rows, ascending.
        assert_eq!(output.table.years(), vec![2023, 2024]);
        assert!(output.into_result().is_err());
    }
}
