use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::display_text;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get("results") {
                print_array_table(rows);
                print_footer(map);
            } else if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", display_text(value, "null")),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            // Scalars first, then every list of records as its own table.
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            let mut sections = Vec::new();
            for (key, val) in res_map {
                match val {
                    Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
                        sections.push((key, rows));
                    }
                    Value::Object(inner) => {
                        for (sub, v) in inner {
                            builder.push_record([format!("{key}.{sub}"), display_text(v, "null")]);
                        }
                    }
                    _ => {
                        builder.push_record([key.clone(), display_text(val, "null")]);
                    }
                }
            }
            println!("{}", Table::from(builder));
            for (key, rows) in sections {
                println!("\n{key}:");
                print_array_table(rows);
            }
        }
        other => println!("{}", display_text(other, "null")),
    }
    print_footer(envelope);
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), display_text(val, "null")]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Headers come from the first record; serde_json preserves field order.
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(cell_text)
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", display_text(item, "null"));
        }
    }
}

/// Nested records (e.g. per-loan payments in a scenario row) collapse to
/// `name=value` pairs.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Array(items) if items.iter().all(Value::is_object) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|m| {
                let label = m.get("name").map(|v| display_text(v, "")).unwrap_or_default();
                let amount = m
                    .get("monthly_payment")
                    .map(|v| display_text(v, ""))
                    .unwrap_or_default();
                format!("{label}={amount}")
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => display_text(value, "null"),
    }
}
