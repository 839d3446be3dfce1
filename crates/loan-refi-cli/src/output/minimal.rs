use serde_json::Value;

use super::display_text;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    if let Some(Value::Array(rows)) = value.get("results") {
        println!("{} rows", rows.len());
        return;
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", minimal_answer(result_obj));
}

/// Priority list of key output fields
const PRIORITY_KEYS: [&str; 6] = [
    "formula",
    "monthly_payment",
    "breakeven_periods",
    "combined_breakeven_periods",
    "monthly_savings",
    "total_monthly_payment",
];

fn minimal_answer(result: &Value) -> String {
    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return display_text(val, "null");
                }
            }
        }
        // nested summaries, e.g. schedule and portfolio outputs
        if let Some(summary) = map.get("summary") {
            return minimal_answer(summary);
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, display_text(val, "null"));
        }
    }
    display_text(result, "null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_key_wins() {
        let v = json!({"total_periods": 324, "monthly_payment": "3288.5269"});
        assert_eq!(minimal_answer(&v), "3288.53");
    }

    #[test]
    fn test_nested_summary() {
        let v = json!({"terms": {}, "summary": {"total_monthly_payment": "4719.73"}});
        assert_eq!(minimal_answer(&v), "4719.73");
    }

    #[test]
    fn test_not_applicable_breakeven() {
        let v = json!({"breakeven_periods": "N/A"});
        assert_eq!(minimal_answer(&v), "N/A");
    }
}
