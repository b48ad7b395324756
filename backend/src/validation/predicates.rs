//! Numeric recognizers shared by the column rules.

use once_cell::sync::Lazy;
use regex::Regex;

static INTEGER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid integer pattern"));

/// Sign of an integer literal. The magnitude is never materialized, so any
/// number of digits is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerSign {
    Negative,
    NonNegative,
}

/// Parse a real number. Accepts signs, exponents, `inf` and `nan`.
pub fn parse_real(value: &str) -> Option<f64> {
    value.parse::<f64>().ok()
}

/// Recognize an integer: optional sign followed by ASCII digits only.
///
/// `"1.0"` is not an integer. `"-0"` is non-negative.
pub fn integer_sign(value: &str) -> Option<IntegerSign> {
    if !INTEGER_PATTERN.is_match(value) {
        return None;
    }
    let negative = value.starts_with('-') && value.bytes().any(|b| matches!(b, b'1'..=b'9'));
    Some(if negative {
        IntegerSign::Negative
    } else {
        IntegerSign::NonNegative
    })
}
