// src/services/normalize.rs

//! Text normalizers for free-text table cells.
//!
//! All functions here are total: malformed input maps to zero values or
//! placeholders instead of an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::TBA;

/// A run of digits, optionally comma grouped (`1,200`, `1,00,000`) with an
/// optional fractional part that is dropped when converting.
const NUMBER: &str = r"\d+(?:,\d+)*(?:\.\d+)?";

/// Optional currency marker in front of a figure.
const CURRENCY: &str = r"(?:₹|rs\.?|inr|\$)?";

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)({NUMBER})\s*{CURRENCY}\s*(?:-|–|—|to)\s*{CURRENCY}\s*({NUMBER})"
    );
    Regex::new(&pattern).expect("price range pattern is valid")
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NUMBER).expect("number pattern is valid"));

/// Convert a matched figure to an integer, dropping grouping and decimals.
fn to_integer(figure: &str) -> Option<u32> {
    let whole = figure.split('.').next()?;
    let digits: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Parse a price band such as `₹100 - ₹200`, `100 to 120` or `150`.
///
/// Returns `(low, high)`. A single figure yields `(n, n)`, a reversed band is
/// reordered, and anything unparseable yields `(0, 0)`.
pub fn parse_price_range(text: &str) -> (u32, u32) {
    let text = text.trim();
    if text.is_empty() {
        return (0, 0);
    }

    if let Some(caps) = RANGE_RE.captures(text) {
        let first = caps.get(1).and_then(|m| to_integer(m.as_str()));
        let second = caps.get(2).and_then(|m| to_integer(m.as_str()));
        return match (first, second) {
            (Some(a), Some(b)) => (a.min(b), a.max(b)),
            _ => (0, 0),
        };
    }

    NUMBER_RE
        .find(text)
        .and_then(|m| to_integer(m.as_str()))
        .map_or((0, 0), |n| (n, n))
}

/// Parse a lot size such as `1500 shares`. Returns 0 when no figure is found.
pub fn parse_lot_size(text: &str) -> u32 {
    NUMBER_RE
        .find(text)
        .and_then(|m| to_integer(m.as_str()))
        .unwrap_or(0)
}

/// Trim a cell and collapse internal whitespace runs to single spaces.
pub fn clean_cell(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display value for a close date cell, `TBA` when empty.
pub fn close_date_or_tba(text: &str) -> String {
    if text.is_empty() {
        TBA.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_range_with_currency_symbols() {
        assert_eq!(parse_price_range("₹100 - ₹200"), (100, 200));
        assert_eq!(parse_price_range("Rs. 95 to Rs. 100"), (95, 100));
        assert_eq!(parse_price_range("$12–$14"), (12, 14));
    }

    #[test]
    fn price_range_plain_dash_and_word() {
        assert_eq!(parse_price_range("100-120"), (100, 120));
        assert_eq!(parse_price_range("100 TO 120"), (100, 120));
        assert_eq!(parse_price_range("100to120"), (100, 120));
    }

    #[test]
    fn single_price_repeats_value() {
        assert_eq!(parse_price_range("150"), (150, 150));
        assert_eq!(parse_price_range("₹ 72 per share"), (72, 72));
    }

    #[test]
    fn missing_price_is_zero() {
        assert_eq!(parse_price_range(""), (0, 0));
        assert_eq!(parse_price_range("   "), (0, 0));
        assert_eq!(parse_price_range("Price TBA"), (0, 0));
    }

    #[test]
    fn grouped_and_decimal_figures() {
        assert_eq!(parse_price_range("₹1,100 - ₹1,200"), (1100, 1200));
        assert_eq!(parse_price_range("99.50 - 105.75"), (99, 105));
    }

    #[test]
    fn reversed_range_is_reordered() {
        assert_eq!(parse_price_range("200 - 100"), (100, 200));
    }

    #[test]
    fn overflowing_figure_is_zero() {
        assert_eq!(parse_price_range("99999999999999999999"), (0, 0));
        assert_eq!(parse_price_range("1 - 99999999999999999999"), (0, 0));
    }

    #[test]
    fn lot_size_first_figure() {
        assert_eq!(parse_lot_size("1500 shares"), 1500);
        assert_eq!(parse_lot_size("Lot: 1,200"), 1200);
        assert_eq!(parse_lot_size(""), 0);
        assert_eq!(parse_lot_size("N/A"), 0);
    }

    #[test]
    fn clean_cell_collapses_whitespace() {
        assert_eq!(clean_cell("  Acme \n  Corp\t"), "Acme Corp");
        assert_eq!(clean_cell(""), "");
    }

    #[test]
    fn close_date_defaults_to_tba() {
        assert_eq!(close_date_or_tba(""), "TBA");
        assert_eq!(close_date_or_tba("05 Mar"), "05 Mar");
    }
}
