//! Numeric and text coercion for loosely-typed extractor output
//!
//! Extractors emit numbers as JSON numbers, numeric strings, or sentinel
//! markers such as `"NA"`. Everything here is total: a value either
//! coerces to a finite `f64` or yields `None`.

use serde_json::Value;

/// Markers an extractor uses when it could not determine a value
const NOT_AVAILABLE_MARKERS: &[&str] = &[
    "na",
    "n/a",
    "n.a.",
    "nan",
    "none",
    "null",
    "nil",
    "unknown",
    "not available",
    "not_available",
    "-",
];

/// Whether a string is an explicit "not available" marker (or blank)
pub fn is_not_available(s: &str) -> bool {
    let s = s.trim().to_lowercase();
    s.is_empty() || NOT_AVAILABLE_MARKERS.contains(&s.as_str())
}

/// Parse a numeric string into a finite `f64`
///
/// Accepts surrounding whitespace and `,` thousands separators
/// (`"1,200.5"`). A comma anywhere else (`"1,5"`) makes the string
/// unparseable. Rejects `inf`/`NaN` spellings and sentinel markers.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if is_not_available(s) {
        return None;
    }
    let cleaned: String = strip_thousands(s)?.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Remove `,` thousands separators, rejecting misplaced commas
///
/// The integer part must group as `d{1,3}(,ddd)*`; the fraction may not
/// contain commas at all.
fn strip_thousands(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }

    let body = s.trim_start_matches(|c: char| c == '-' || c == '+');
    let sign = &s[..s.len() - body.len()];
    let (int_part, fraction) = match body.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (body, None),
    };
    if fraction.map_or(false, |f| f.contains(',')) {
        return None;
    }

    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let mut groups = int_part.split(',');
    let lead = groups.next()?;
    if lead.is_empty() || lead.len() > 3 || !all_digits(lead) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && all_digits(g)) {
        return None;
    }

    let mut cleaned = format!("{}{}", sign, int_part.replace(',', ""));
    if let Some(fraction) = fraction {
        cleaned.push('.');
        cleaned.push_str(fraction);
    }
    Some(cleaned)
}

/// Coerce a JSON value into a finite `f64`
///
/// Numbers and numeric strings coerce; booleans, null, arrays and objects
/// do not.
pub fn json_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Clamp to zero from below, mapping non-finite values to zero
pub fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Render a JSON scalar as a label
///
/// Strings are trimmed; numbers and booleans use their JSON spelling.
/// Returns `None` for null, blank strings and containers.
pub fn json_to_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(number_label(n.as_f64()?)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Label for a numeric impact hint: `4.0` renders as `"4"`
pub fn number_label(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number("10"), Some(10.0));
        assert_eq!(parse_number(" 0.25 "), Some(0.25));
        assert_eq!(parse_number("-3"), Some(-3.0));
    }

    #[test]
    fn test_parse_number_thousands_separator() {
        assert_eq!(parse_number("1,200.5"), Some(1200.5));
        assert_eq!(parse_number("12,345,678"), Some(12_345_678.0));
        assert_eq!(parse_number("-1,000"), Some(-1000.0));
    }

    #[test]
    fn test_parse_number_rejects_decimal_comma() {
        assert_eq!(parse_number("1,5"), None);
        assert_eq!(parse_number("0,2"), None);
        assert_eq!(parse_number("2,5"), None);
        assert_eq!(parse_number("1,2345"), None);
        assert_eq!(parse_number(",100"), None);
        assert_eq!(parse_number("1000,000"), None);
        assert_eq!(parse_number("1.5,0"), None);
    }

    #[test]
    fn test_parse_number_rejects_markers_and_non_finite() {
        assert_eq!(parse_number("NA"), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("ten"), None);
    }

    #[test]
    fn test_is_not_available() {
        assert!(is_not_available("NA"));
        assert!(is_not_available("  Not Available "));
        assert!(is_not_available("   "));
        assert!(!is_not_available("0"));
        assert!(!is_not_available("0.2"));
    }

    #[test]
    fn test_json_to_f64() {
        assert_eq!(json_to_f64(&json!(2)), Some(2.0));
        assert_eq!(json_to_f64(&json!(0.2)), Some(0.2));
        assert_eq!(json_to_f64(&json!("7.5")), Some(7.5));
        assert_eq!(json_to_f64(&json!(true)), None);
        assert_eq!(json_to_f64(&json!(null)), None);
        assert_eq!(json_to_f64(&json!([1])), None);
        assert_eq!(json_to_f64(&json!({"v": 1})), None);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(5.0), 5.0);
        assert_eq!(non_negative(-5.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
        assert_eq!(non_negative(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_json_to_label() {
        assert_eq!(json_to_label(&json!(" high ")), Some("high".to_string()));
        assert_eq!(json_to_label(&json!(4)), Some("4".to_string()));
        assert_eq!(json_to_label(&json!(4.0)), Some("4".to_string()));
        assert_eq!(json_to_label(&json!(2.5)), Some("2.5".to_string()));
        assert_eq!(json_to_label(&json!("")), None);
        assert_eq!(json_to_label(&json!(null)), None);
        assert_eq!(json_to_label(&json!(["x"])), None);
    }
}
