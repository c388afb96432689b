//! Statement location: find the page carrying a named financial statement.
//!
//! Annual reports run to hundreds of pages and the printed page numbers drift
//! from the PDF page numbers (cover sheets, inserts). The locator takes an
//! operator-supplied approximate page and scans a window around it for the
//! statement's title phrase; with no hint it scans the whole document front
//! to back.

use crate::config::StatementKind;
use tracing::{debug, info};

/// Where a statement was found: the 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedPage {
    pub page: usize,
}

/// The searched window, for diagnostics when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    /// First 1-based page searched.
    pub first: usize,
    /// Last 1-based page searched.
    pub last: usize,
}

/// Find the first page whose text contains `statement`'s title phrase.
///
/// `hint` is a 1-based approximate page; `radius` pages on each side are
/// searched, clamped to the document. Returns the located page or the window
/// that was searched without a match.
pub fn locate_statement(
    pages: &[String],
    statement: StatementKind,
    hint: Option<usize>,
    radius: usize,
) -> Result<LocatedPage, SearchWindow> {
    let total = pages.len();
    let window = match hint {
        Some(h) => SearchWindow {
            first: h.saturating_sub(radius).max(1),
            last: h.saturating_add(radius).min(total),
        },
        None => SearchWindow {
            first: 1,
            last: total,
        },
    };
    if total == 0 || window.first > window.last {
        return Err(SearchWindow {
            first: window.first.min(total.max(1)),
            last: window.last.min(total),
        });
    }

    let phrase = statement.title_phrase();
    for page in window.first..=window.last {
        let text = pages[page - 1].to_lowercase();
        if text.contains(phrase) {
            info!(%statement, page, "located statement");
            return Ok(LocatedPage { page });
        }
        debug!(%statement, page, "no title match");
    }
    Err(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages_with(statement_page: usize, total: usize, title: &str) -> Vec<String> {
        (1..=total)
            .map(|p| {
                if p == statement_page {
                    format!("Page {p}\n{title}\nYear ended 31 March")
                } else {
                    format!("Page {p}\nNotes to the financial statements")
                }
            })
            .collect()
    }

    #[test]
    fn finds_the_statement_near_the_hint() {
        let pages = pages_with(
            183,
            200,
            "Consolidated statement of comprehensive income",
        );
        let found = locate_statement(
            &pages,
            StatementKind::ComprehensiveIncome,
            Some(180),
            10,
        )
        .unwrap();
        assert_eq!(found.page, 183);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let pages = pages_with(3, 5, "CONSOLIDATED STATEMENT OF CASH FLOWS");
        let found = locate_statement(&pages, StatementKind::CashFlows, None, 0).unwrap();
        assert_eq!(found.page, 3);
    }

    #[test]
    fn no_hint_scans_the_whole_document() {
        let pages = pages_with(
            197,
            200,
            "Consolidated statement of financial position",
        );
        let found =
            locate_statement(&pages, StatementKind::FinancialPosition, None, 10).unwrap();
        assert_eq!(found.page, 197);
    }

    #[test]
    fn window_is_clamped_to_document_bounds() {
        let pages = pages_with(2, 5, "Consolidated statement of comprehensive income");
        // Hint 1 with radius 10 must not underflow below page 1.
        let found = locate_statement(
            &pages,
            StatementKind::ComprehensiveIncome,
            Some(1),
            10,
        )
        .unwrap();
        assert_eq!(found.page, 2);
    }

    #[test]
    fn miss_reports_the_searched_window() {
        let pages = pages_with(50, 60, "Consolidated statement of cash flows");
        let window = locate_statement(
            &pages,
            StatementKind::ComprehensiveIncome,
            Some(10),
            5,
        )
        .unwrap_err();
        assert_eq!(window, SearchWindow { first: 5, last: 15 });
    }

    #[test]
    fn statement_outside_the_window_is_a_miss() {
        let pages = pages_with(
            50,
            60,
            "Consolidated statement of comprehensive income",
        );
        assert!(locate_statement(
            &pages,
            StatementKind::ComprehensiveIncome,
            Some(10),
            5
        )
        .is_err());
    }
}
