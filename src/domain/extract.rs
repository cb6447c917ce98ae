//! Text-to-number extraction for free-form profile inputs.
//!
//! Age brackets ("18-22", "Above 30") and CGPA strings ("3.50") arrive as text.
//! The model wants a single number per field: the lower bound of a dashed
//! range, otherwise the first numeric token, otherwise `0.0`.

use regex::Regex;
use std::sync::OnceLock;

static NUMBER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn number_pattern() -> &'static Regex {
    NUMBER_PATTERN.get_or_init(|| Regex::new(r"[-+]?\d*\.\d+|\d+").expect("Valid regex"))
}

/// Extract the leading numeric value from `text`.
///
/// - `"18-22"` → `18.0` (lower bound of a range)
/// - `"3.50"` → `3.5`
/// - `"Above 30"` → `30.0`
/// - `"N/A"` → `0.0`
///
/// Any text containing `-` is read as a range: only the part before the first
/// dash counts, so `"-5"` and `"about 18-22"` both give `0.0`.
#[must_use]
pub fn extract_number(text: &str) -> f64 {
    if let Some((lower, _)) = text.split_once('-') {
        return parse_finite(lower.trim()).unwrap_or(0.0);
    }

    number_pattern()
        .find(text)
        .and_then(|m| parse_finite(m.as_str()))
        .unwrap_or(0.0)
}

/// Like [`extract_number`], treating a missing value as `0.0`.
#[must_use]
pub fn extract_number_opt(text: Option<&str>) -> f64 {
    text.map(extract_number).unwrap_or(0.0)
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_brackets() {
        assert_eq!(extract_number("18-22"), 18.0);
        assert_eq!(extract_number("23 - 26"), 23.0);
        assert_eq!(extract_number("27-30"), 27.0);
        assert_eq!(extract_number("Above 30"), 30.0);
    }

    #[test]
    fn test_decimals() {
        assert!((extract_number("3.50") - 3.5).abs() < f64::EPSILON);
        assert!((extract_number("CGPA: 3.75 / 4") - 3.75).abs() < f64::EPSILON);
        assert!((extract_number(".5") - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dash_without_lower_bound_is_zero() {
        assert_eq!(extract_number("-5"), 0.0);
        assert_eq!(extract_number("-5.0"), 0.0);
        assert_eq!(extract_number("delta -0.25"), 0.0);
        assert_eq!(extract_number("about 18-22"), 0.0);
    }

    #[test]
    fn test_plus_sign_is_kept() {
        assert!((extract_number("+3.25") - 3.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_numeric_defaults_to_zero() {
        assert_eq!(extract_number(""), 0.0);
        assert_eq!(extract_number("N/A"), 0.0);
        assert_eq!(extract_number("---"), 0.0);
        assert_eq!(extract_number_opt(None), 0.0);
    }

    #[test]
    fn test_optional_input() {
        assert_eq!(extract_number_opt(Some("4.00")), 4.0);
    }
}
