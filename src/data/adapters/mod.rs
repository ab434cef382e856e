//! Concrete adapters, grouped by outer format.

pub mod default;
pub mod json;
pub mod sql;

pub use default::DefaultAdapter;

use serde_json::Value;

/// Integer view of a numeric value or numeric string.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// Truthiness of the common boolean spellings; `None` if unrecognized.
pub(crate) fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Some(true),
            "false" | "0" | "off" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&json!(42)), Some(42));
        assert_eq!(as_integer(&json!(" 7 ")), Some(7));
        assert_eq!(as_integer(&json!("12.9")), Some(12));
        assert_eq!(as_integer(&json!(-3.5)), Some(-3));
        assert_eq!(as_integer(&json!("abc")), None);
        assert_eq!(as_integer(&json!(true)), None);
    }

    #[test]
    fn test_as_boolean() {
        assert_eq!(as_boolean(&json!("On")), Some(true));
        assert_eq!(as_boolean(&json!("")), Some(false));
        assert_eq!(as_boolean(&json!(0)), Some(false));
        assert_eq!(as_boolean(&json!("maybe")), None);
    }
}
