//! Integer coercion for loosely typed qlog values
//!
//! Producers disagree on how numbers are written: most emit JSON integers,
//! some emit floats for RTTs, some quote large values as strings and a few
//! write `app_limited` as a boolean. All of them collapse to `i64` here.

use serde_json::Value;

/// Coerce a JSON value to an integer.
///
/// Accepts integers, floats (truncated toward zero), booleans (0/1) and
/// strings holding either form. Returns `None` for anything else, including
/// floats that do not fit in an `i64`.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| n.as_f64().and_then(float_to_i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_i64))
        }
        _ => None,
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    if !f.is_finite() {
        return None;
    }
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if t >= -(2f64.powi(63)) && t < 2f64.powi(63) {
        Some(t as i64)
    } else {
        None
    }
}

/// Short rendering of a value for diagnostics
pub fn describe(value: &Value) -> String {
    const MAX: usize = 64;
    let text = value.to_string();
    if text.len() <= MAX {
        text
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integers_and_floats() {
        assert_eq!(coerce_i64(&json!(42)), Some(42));
        assert_eq!(coerce_i64(&json!(-7)), Some(-7));
        assert_eq!(coerce_i64(&json!(12.9)), Some(12));
        assert_eq!(coerce_i64(&json!(-12.9)), Some(-12));
    }

    #[test]
    fn test_coerce_strings_and_bools() {
        assert_eq!(coerce_i64(&json!("1500")), Some(1500));
        assert_eq!(coerce_i64(&json!(" 33.5 ")), Some(33));
        assert_eq!(coerce_i64(&json!(true)), Some(1));
        assert_eq!(coerce_i64(&json!(false)), Some(0));
    }

    #[test]
    fn test_coerce_rejects_non_numeric() {
        assert_eq!(coerce_i64(&json!("fast")), None);
        assert_eq!(coerce_i64(&json!(null)), None);
        assert_eq!(coerce_i64(&json!([1])), None);
        assert_eq!(coerce_i64(&json!({"a": 1})), None);
        assert_eq!(coerce_i64(&json!(u64::MAX)), None);
        assert_eq!(coerce_i64(&json!(1e300)), None);
    }

    #[test]
    fn test_describe_truncates() {
        let long = json!("x".repeat(200));
        let text = describe(&long);
        assert!(text.ends_with("..."));
        assert!(text.len() <= 67);
        assert_eq!(describe(&json!(5)), "5");
    }
}
