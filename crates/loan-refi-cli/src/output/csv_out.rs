use serde_json::{Map, Value};
use std::io;

use super::scalar_text;

/// Write output as CSV to stdout at full precision.
///
/// Row views and envelopes holding a `schedule` (or other list of records)
/// are written one record per line in field order; anything else becomes a
/// two-column `field,value` listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Array(results)) = map.get("results") {
                write_array_csv(&mut wtr, results);
            } else if let Some(Value::Object(result)) = map.get("result") {
                match primary_rows(result) {
                    Some(rows) => write_array_csv(&mut wtr, rows),
                    None => write_field_value_csv(&mut wtr, result),
                }
            } else {
                write_field_value_csv(&mut wtr, map);
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&scalar_text(value, "")]);
        }
    }

    let _ = wtr.flush();
}

/// The record list an export should contain, by priority.
fn primary_rows(result: &Map<String, Value>) -> Option<&Vec<Value>> {
    ["schedule", "scenarios", "loans"]
        .iter()
        .find_map(|key| match result.get(*key) {
            Some(Value::Array(rows)) => Some(rows),
            _ => None,
        })
}

fn write_field_value_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &scalar_text(val, "")]);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(|v| scalar_text(v, "")).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&scalar_text(item, "")]);
        }
    }
}
