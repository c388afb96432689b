//! Row building: page text to ordered rows of raw cells.
//!
//! `pdf-extract` yields a page as plain text lines, not cell grids. Each
//! non-empty line becomes one [`RawRow`] whose cells are the line's
//! whitespace-separated tokens; a figure like `384,433.0` or `(31,334.5)`
//! survives as a single token because it contains no spaces.
//!
//! ## Continuation merge
//!
//! Some report layouts place a line item's figures on the line(s) below the
//! label:
//!
//! ```text
//! Total revenue
//!     388,674.0    335,251.0
//! ```
//!
//! When a line has letters but no numeric token, and the following line has
//! numeric tokens but no letters, the numeric line's tokens are appended to
//! the label line's cells and the numeric line is consumed. At most
//! `lookahead` lines are merged per row
//! ([`crate::config::ExtractionConfig::lookahead`], default 2).

use once_cell::sync::Lazy;
use regex::Regex;

/// Numeric-looking token: optional parentheses around comma-grouped digits
/// with an optional fractional part. Used only to decide whether a line
/// carries figures; cell values are parsed later by the normaliser.
static RE_NUMERIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?\d[\d,]*(?:\.\d+)?\)?").unwrap());

/// One table/text row: the raw cells in source order plus the lowercased
/// row text used for label matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<String>,
    text: String,
}

impl RawRow {
    /// Build a row from its cells. Empty cells are kept (they count as
    /// unavailable during value scanning) but excluded from the row text.
    pub fn new(cells: Vec<String>) -> Self {
        let text = cells
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self { cells, text }
    }

    /// Cells in source order, left to right.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Lowercased row text, the input to rule matching.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split one page's text into rows, applying the continuation merge.
pub fn build_rows(page_text: &str, lookahead: usize) -> Vec<RawRow> {
    let lines: Vec<&str> = page_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut rows = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let mut cells: Vec<String> = line.split_whitespace().map(str::to_string).collect();

        let mut consumed = 0;
        if has_letters(line) && !has_numeric_token(line) {
            while consumed < lookahead {
                let Some(next) = lines.get(i + 1 + consumed) else {
                    break;
                };
                if has_numeric_token(next) && !has_letters(next) {
                    cells.extend(next.split_whitespace().map(str::to_string));
                    consumed += 1;
                } else {
                    break;
                }
            }
        }

        rows.push(RawRow::new(cells));
        i += 1 + consumed;
    }
    rows
}

fn has_letters(line: &str) -> bool {
    line.chars().any(|c| c.is_alphabetic())
}

fn has_numeric_token(line: &str) -> bool {
    RE_NUMERIC_TOKEN.is_match(line)
}
