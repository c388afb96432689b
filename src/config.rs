//! Configuration types for annual-report extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to log a run's settings and diff two runs to understand why
//! their outputs differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest; `build()` validates the combination
//! (non-empty document set, unique fiscal years, sane page hints) in one
//! place instead of scattering checks through the pipeline.

use crate::error::ExtractError;
use crate::metrics::{default_rules, MetricRule};
use crate::progress::BatchProgressCallback;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for a batch extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or loaded from a JSON manifest
/// with [`ExtractionConfig::from_manifest`].
///
/// # Example
/// ```rust
/// use pdf2fin::{DocumentSpec, ExtractionConfig, StatementKind};
///
/// let config = ExtractionConfig::builder()
///     .document(
///         DocumentSpec::new("reports/annual_2025.pdf", 2025)
///             .with_hint(StatementKind::ComprehensiveIncome, 201),
///     )
///     .search_radius(8)
///     .build()
///     .unwrap();
/// assert_eq!(config.documents.len(), 1);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Documents to process, one per fiscal year.
    pub documents: Vec<DocumentSpec>,

    /// Row-classification rules, evaluated in order. Default: [`default_rules()`].
    ///
    /// Replacing the table is how floors and patterns are tuned for a report
    /// whose wording drifts from the defaults.
    pub rules: Vec<MetricRule>,

    /// Pages scanned on each side of a page hint. Range: 0-100. Default: 10.
    ///
    /// Printed page numbers drift a few pages from PDF page numbers because
    /// of cover sheets and inserts; a radius of 10 absorbs that drift without
    /// scanning the whole document.
    pub search_radius: usize,

    /// Maximum continuation lines merged into one row. Range: 0-5. Default: 2.
    ///
    /// Some report layouts place a line item's figures on the line(s) below
    /// the label. 0 disables merging entirely.
    pub lookahead: usize,

    /// Directory for the flat-file outputs. Default: `data/processed`.
    pub out_dir: PathBuf,

    /// Dump each located statement page's raw text under `<out_dir>/pages/`.
    /// Default: false.
    pub dump_pages: bool,

    /// Progress callback invoked per document during a batch run.
    pub progress: Option<Arc<dyn BatchProgressCallback>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            rules: default_rules(),
            search_radius: 10,
            lookahead: 2,
            out_dir: PathBuf::from("data/processed"),
            dump_pages: false,
            progress: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("documents", &self.documents)
            .field("rules", &self.rules.len())
            .field("search_radius", &self.search_radius)
            .field("lookahead", &self.lookahead)
            .field("out_dir", &self.out_dir)
            .field("dump_pages", &self.dump_pages)
            .field(
                "progress",
                &self.progress.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load a document manifest and build a config with default settings.
    ///
    /// The manifest is a JSON array of [`DocumentSpec`] objects:
    ///
    /// ```json
    /// [
    ///   { "path": "reports/annual_2023.pdf", "fiscal_year": 2023,
    ///     "page_hints": { "comprehensive_income": 188 } },
    ///   { "path": "reports/annual_2024.pdf", "fiscal_year": 2024,
    ///     "page_hints": { "comprehensive_income": 181 } }
    /// ]
    /// ```
    pub fn from_manifest(path: impl AsRef<Path>) -> Result<ExtractionConfig, ExtractError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ExtractError::ManifestRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let documents: Vec<DocumentSpec> =
            serde_json::from_str(&raw).map_err(|e| ExtractError::ManifestParse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        Self::builder().documents(documents).build()
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    /// Replace the document set.
    pub fn documents(mut self, documents: Vec<DocumentSpec>) -> Self {
        self.config.documents = documents;
        self
    }

    /// Append one document.
    pub fn document(mut self, document: DocumentSpec) -> Self {
        self.config.documents.push(document);
        self
    }

    /// Replace the classification rule table.
    pub fn rules(mut self, rules: Vec<MetricRule>) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn search_radius(mut self, radius: usize) -> Self {
        self.config.search_radius = radius.min(100);
        self
    }

    pub fn lookahead(mut self, lines: usize) -> Self {
        self.config.lookahead = lines.min(5);
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    pub fn dump_pages(mut self, v: bool) -> Self {
        self.config.dump_pages = v;
        self
    }

    pub fn progress_callback(mut self, callback: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ExtractionConfig, ExtractError> {
        let c = &mut self.config;

        if c.documents.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "at least one document is required".into(),
            ));
        }
        let mut seen_years = std::collections::BTreeSet::new();
        for doc in &c.documents {
            if !(1900..=2100).contains(&doc.fiscal_year) {
                return Err(ExtractError::InvalidConfig(format!(
                    "fiscal year {} is out of range (expected 1900-2100)",
                    doc.fiscal_year
                )));
            }
            if !seen_years.insert(doc.fiscal_year) {
                return Err(ExtractError::DuplicateFiscalYear {
                    year: doc.fiscal_year,
                });
            }
            for (&statement, &page) in &doc.page_hints {
                if page == 0 {
                    return Err(ExtractError::InvalidConfig(format!(
                        "page hint for '{statement}' in FY{} is 0; page numbers are 1-based",
                        doc.fiscal_year
                    )));
                }
            }
        }

        if c.rules.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "the rule table must contain at least one rule".into(),
            ));
        }
        for rule in &mut c.rules {
            if rule.required.is_empty() {
                return Err(ExtractError::InvalidConfig(format!(
                    "rule for '{}' has no required patterns",
                    rule.metric
                )));
            }
            if !rule.floor.is_finite() || rule.floor < 0.0 {
                return Err(ExtractError::InvalidConfig(format!(
                    "rule for '{}' has an invalid floor {}",
                    rule.metric, rule.floor
                )));
            }
            // Matching is case-insensitive via lowercased row text; rules
            // loaded from JSON may arrive in any case.
            for pattern in rule.required.iter_mut().chain(rule.excluded.iter_mut()) {
                *pattern = pattern.to_lowercase();
            }
        }

        Ok(self.config)
    }
}

// ── Documents ────────────────────────────────────────────────────────────

/// One input document: an annual report covering one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Path to the PDF.
    pub path: PathBuf,
    /// Fiscal year the report covers.
    pub fiscal_year: u16,
    /// Approximate 1-based page numbers per statement, narrowing the
    /// Locator's search window. Missing hints fall back to a full scan.
    #[serde(default)]
    pub page_hints: BTreeMap<StatementKind, usize>,
}

impl DocumentSpec {
    pub fn new(path: impl Into<PathBuf>, fiscal_year: u16) -> Self {
        Self {
            path: path.into(),
            fiscal_year,
            page_hints: BTreeMap::new(),
        }
    }

    /// Add a page hint for one statement.
    pub fn with_hint(mut self, statement: StatementKind, page: usize) -> Self {
        self.page_hints.insert(statement, page);
        self
    }

    /// Hint for `statement`, if the manifest supplied one.
    pub fn hint(&self, statement: StatementKind) -> Option<usize> {
        self.page_hints.get(&statement).copied()
    }
}

// ── Statements ───────────────────────────────────────────────────────────

/// The named financial statements the Locator can find.
///
/// Metric extraction reads [`StatementKind::ComprehensiveIncome`] only; the
/// other kinds exist for `locate`/`inspect` and page dumps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    ComprehensiveIncome,
    FinancialPosition,
    CashFlows,
}

impl StatementKind {
    /// Every statement kind, in report order.
    pub const ALL: [StatementKind; 3] = [
        StatementKind::ComprehensiveIncome,
        StatementKind::FinancialPosition,
        StatementKind::CashFlows,
    ];

    /// Title phrase searched for in page text (lowercase).
    pub fn title_phrase(&self) -> &'static str {
        match self {
            StatementKind::ComprehensiveIncome => "consolidated statement of comprehensive income",
            StatementKind::FinancialPosition => "consolidated statement of financial position",
            StatementKind::CashFlows => "consolidated statement of cash flows",
        }
    }

    /// Short identifier used in file names and the JSON manifest.
    pub fn slug(&self) -> &'static str {
        match self {
            StatementKind::ComprehensiveIncome => "comprehensive_income",
            StatementKind::FinancialPosition => "financial_position",
            StatementKind::CashFlows => "cash_flows",
        }
    }

    /// Parse a user-supplied name, accepting common shorthand.
    pub fn parse(s: &str) -> Option<StatementKind> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "income" | "comprehensive_income" | "income_statement" => {
                Some(StatementKind::ComprehensiveIncome)
            }
            "position" | "balance" | "balance_sheet" | "financial_position" => {
                Some(StatementKind::FinancialPosition)
            }
            "cash" | "cashflow" | "cashflows" | "cash_flow" | "cash_flows" => {
                Some(StatementKind::CashFlows)
            }
            _ => None,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::ComprehensiveIncome => "comprehensive income",
            StatementKind::FinancialPosition => "financial position",
            StatementKind::CashFlows => "cash flows",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(year: u16) -> DocumentSpec {
        DocumentSpec::new(format!("reports/annual_{year}.pdf"), year)
    }

    #[test]
    fn build_rejects_empty_document_set() {
        let err = ExtractionConfig::builder().build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_duplicate_fiscal_years() {
        let err = ExtractionConfig::builder()
            .document(spec(2024))
            .document(spec(2024))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::DuplicateFiscalYear { year: 2024 }
        ));
    }

    #[test]
    fn build_rejects_zero_page_hint() {
        let err = ExtractionConfig::builder()
            .document(spec(2024).with_hint(StatementKind::ComprehensiveIncome, 0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn build_lowercases_rule_patterns() {
        use crate::metrics::{CanonicalMetric, MetricRule};
        let mut rule =
            MetricRule::new(CanonicalMetric::TotalRevenue, &["total revenue"], &[], 1.0);
        rule.required[0] = "Total Revenue".into();
        let config = ExtractionConfig::builder()
            .document(spec(2024))
            .rules(vec![rule])
            .build()
            .unwrap();
        assert_eq!(config.rules[0].required[0], "total revenue");
    }

    #[test]
    fn setters_clamp_ranges() {
        let config = ExtractionConfig::builder()
            .document(spec(2024))
            .search_radius(10_000)
            .lookahead(99)
            .build()
            .unwrap();
        assert_eq!(config.search_radius, 100);
        assert_eq!(config.lookahead, 5);
    }

    #[test]
    fn manifest_round_trips_page_hints() {
        let json = r#"[
            { "path": "reports/annual_2023.pdf", "fiscal_year": 2023,
              "page_hints": { "comprehensive_income": 188, "cash_flows": 194 } },
            { "path": "reports/annual_2024.pdf", "fiscal_year": 2024 }
        ]"#;
        let documents: Vec<DocumentSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(
            documents[0].hint(StatementKind::ComprehensiveIncome),
            Some(188)
        );
        assert_eq!(documents[0].hint(StatementKind::CashFlows), Some(194));
        assert_eq!(documents[1].hint(StatementKind::ComprehensiveIncome), None);
    }

    #[test]
    fn statement_parse_accepts_shorthand() {
        assert_eq!(
            StatementKind::parse("income"),
            Some(StatementKind::ComprehensiveIncome)
        );
        assert_eq!(
            StatementKind::parse("Balance-Sheet"),
            Some(StatementKind::FinancialPosition)
        );
        assert_eq!(
            StatementKind::parse("cash_flows"),
            Some(StatementKind::CashFlows)
        );
        assert_eq!(StatementKind::parse("equity"), None);
    }
}
