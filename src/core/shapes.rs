use serde_json::Value;

/// Keys under which list endpoints are known to wrap their rows.
pub const LIST_ENVELOPE_KEYS: [&str; 5] = ["data", "items", "profiles", "employeeGrowth", "results"];

pub const FLOAT_TOLERANCE: f64 = 0.01;

/// 從回應中取出清單：本身是陣列、只有一個陣列欄位的物件，或已知鍵下的陣列
pub fn unwrap_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => {
            if obj.len() == 1 {
                if let Some(Value::Array(items)) = obj.values().next() {
                    return Some(items);
                }
            }
            LIST_ENVELOPE_KEYS
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_array))
        }
        _ => None,
    }
}

pub fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

pub fn is_non_negative_integer(value: &Value) -> bool {
    value.is_u64() || value.as_i64().map(|n| n >= 0).unwrap_or(false)
}

pub fn number_in_range(value: &Value, min: f64, max: f64) -> bool {
    value.as_f64().map(|n| n >= min && n <= max).unwrap_or(false)
}

pub fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Integer metrics must match exactly; anything else within `FLOAT_TOLERANCE`.
pub fn metrics_match(expected: &Value, actual: &Value) -> bool {
    if is_integer(expected) {
        return match (expected.as_i64(), actual.as_f64()) {
            (Some(e), Some(a)) => a.fract() == 0.0 && a == e as f64,
            _ => expected == actual,
        };
    }
    match (expected.as_f64(), actual.as_f64()) {
        (Some(e), Some(a)) => approx_eq(e, a, FLOAT_TOLERANCE),
        _ => false,
    }
}

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// 物件或陣列中是否含有數值，最多往下看一層（用於圓餅圖資料）
pub fn has_numeric_values(value: &Value) -> bool {
    let nested = |v: &Value| match v {
        Value::Number(_) => true,
        Value::Array(items) => items.iter().any(Value::is_number),
        _ => false,
    };
    match value {
        Value::Object(obj) => obj.values().any(nested),
        Value::Array(items) => items.iter().any(nested),
        _ => false,
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_list_variants() {
        let bare = json!([1, 2]);
        assert_eq!(unwrap_list(&bare).unwrap().len(), 2);

        let single_key = json!({"growth": [1, 2, 3]});
        assert_eq!(unwrap_list(&single_key).unwrap().len(), 3);

        let known_key = json!({"total": 4, "items": [{"id": 1}]});
        assert_eq!(unwrap_list(&known_key).unwrap().len(), 1);

        let no_list = json!({"total": 4, "other": [1]});
        assert!(unwrap_list(&no_list).is_none());
        assert!(unwrap_list(&json!("text")).is_none());
    }

    #[test]
    fn test_metrics_match() {
        assert!(metrics_match(&json!(10), &json!(10)));
        assert!(metrics_match(&json!(10), &json!(10.0)));
        assert!(!metrics_match(&json!(10), &json!(11)));
        assert!(metrics_match(&json!(87.456), &json!(87.45)));
        assert!(!metrics_match(&json!(87.456), &json!(87.3)));
        assert!(!metrics_match(&json!(1.5), &json!("1.5")));
    }

    #[test]
    fn test_numeric_predicates() {
        assert!(is_non_negative_integer(&json!(0)));
        assert!(!is_non_negative_integer(&json!(-1)));
        assert!(!is_non_negative_integer(&json!(2.5)));
        assert!(number_in_range(&json!(42.5), 0.0, 100.0));
        assert!(!number_in_range(&json!(101), 0.0, 100.0));
        assert!(has_numeric_values(&json!({"days": [1, 2], "label": "x"})));
        assert!(!has_numeric_values(&json!({"label": "x"})));
    }
}
