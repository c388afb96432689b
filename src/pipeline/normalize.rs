//! Value normalisation: raw table cells to signed numeric values.
//!
//! Annual-report tables encode numbers the way accountants read them, not the
//! way `f64::from_str` does:
//!
//! - Thousands separators: `384,433.0`
//! - Negatives wholly wrapped in parentheses: `(31,334.5)`
//! - Empty cells and bare `-` meaning "no figure for this column"
//! - Note references (`5(a)`, `27`) sitting in the same row as real figures
//!
//! This module applies the normalisation rules in a fixed order. The single
//! most important property: a token that cannot be parsed is **unavailable**
//! (`None`), never zero or any other fabricated number.
//!
//! ## Rule Order
//!
//! 1. Absent/empty input resolves to unavailable (not an error)
//! 2. Trim surrounding whitespace, remove thousands-separator commas
//! 3. Rewrite the accounting-negative convention `(N)` to `-N`
//! 4. Parse as a plain decimal; any residue resolves to unavailable
//!
//! Parentheses must be rewritten after comma removal so `(1,234.5)` reduces
//! to `(1234.5)` before the wrapper is inspected.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anchored decimal shape accepted after cleaning: optional minus, digits,
/// optional fractional part. Rejects exponent notation, `inf`, and `nan`,
/// which `f64::from_str` would happily accept but which never occur as
/// genuine statement figures.
static RE_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap());

/// Normalise one raw cell token into a signed numeric value.
///
/// Returns `None` for absent, empty, or unparseable tokens. Sign is preserved
/// exactly: `(500)` parses to `-500.0`. No rounding is performed beyond what
/// the source token already encodes.
pub fn normalize_value(raw: Option<&str>) -> Option<f64> {
    let token = raw?.trim();
    if token.is_empty() {
        return None;
    }
    let token = token.replace(',', "");
    let token = rewrite_accounting_negative(&token);
    parse_decimal(&token)
}

// ── Rule 3: accounting negatives ─────────────────────────────────────────

/// Rewrite a value wholly wrapped in parentheses to a leading minus sign.
/// Tokens that are not an exact `( ... )` wrapper pass through unchanged.
fn rewrite_accounting_negative(token: &str) -> String {
    match token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) if !inner.trim().is_empty() => format!("-{}", inner.trim()),
        _ => token.to_string(),
    }
}

// ── Rule 4: strict decimal parse ─────────────────────────────────────────

/// Parse an already-clean token as an anchored plain decimal. Shared with the
/// table reader so hand-edited files face the same strictness as PDF cells.
pub(crate) fn parse_decimal(token: &str) -> Option<f64> {
    if !RE_DECIMAL.is_match(token) {
        return None;
    }
    token.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_decimal() {
        assert_eq!(normalize_value(Some("384433.0")), Some(384_433.0));
        assert_eq!(normalize_value(Some("5")), Some(5.0));
    }

    #[test]
    fn comma_grouped_thousands() {
        assert_eq!(normalize_value(Some("384,433.0")), Some(384_433.0));
        assert_eq!(normalize_value(Some("12,345.6")), Some(12_345.6));
        assert_eq!(normalize_value(Some("1,234,567")), Some(1_234_567.0));
    }

    #[test]
    fn parenthesised_is_negative() {
        assert_eq!(normalize_value(Some("(500)")), Some(-500.0));
        assert_eq!(normalize_value(Some("(1,234.5)")), Some(-1_234.5));
        assert_eq!(normalize_value(Some("( 42 )")), Some(-42.0));
    }

    #[test]
    fn absent_inputs_are_unavailable_not_zero() {
        assert_eq!(normalize_value(None), None);
        assert_eq!(normalize_value(Some("")), None);
        assert_eq!(normalize_value(Some("   ")), None);
        assert_eq!(normalize_value(Some("-")), None);
    }

    #[test]
    fn surrounding_whitespace_is_stripped() {
        assert_eq!(normalize_value(Some("  1,000.5  ")), Some(1_000.5));
    }

    #[test]
    fn non_numeric_residue_is_unavailable() {
        assert_eq!(normalize_value(Some("Total revenue")), None);
        assert_eq!(normalize_value(Some("5(a)")), None);
        assert_eq!(normalize_value(Some("()")), None);
        assert_eq!(normalize_value(Some("(-)")), None);
        assert_eq!(normalize_value(Some("12.34.5")), None);
        assert_eq!(normalize_value(Some("FY2024")), None);
    }

    #[test]
    fn pathological_float_syntax_is_rejected() {
        assert_eq!(normalize_value(Some("nan")), None);
        assert_eq!(normalize_value(Some("inf")), None);
        assert_eq!(normalize_value(Some("-inf")), None);
        assert_eq!(normalize_value(Some("1e5")), None);
        assert_eq!(normalize_value(Some("0x1f")), None);
    }

    #[test]
    fn double_negation_is_rejected() {
        // `(-500)` would rewrite to `--500`; not a statement figure.
        assert_eq!(normalize_value(Some("(-500)")), None);
        assert_eq!(normalize_value(Some("--500")), None);
    }

    #[test]
    fn leading_minus_is_preserved() {
        assert_eq!(normalize_value(Some("-31,334.0")), Some(-31_334.0));
    }

    #[test]
    fn sign_is_exact_for_every_parenthesised_decimal() {
        for (token, expected) in [
            ("(1)", -1.0),
            ("(0.5)", -0.5),
            ("(123456.789)", -123_456.789),
            ("(9,999)", -9_999.0),
        ] {
            assert_eq!(normalize_value(Some(token)), Some(expected), "token {token}");
        }
    }
}
