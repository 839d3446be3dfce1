pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;

/// Decimal places shown for money, rates, and period counts in human views.
const DISPLAY_DP: u32 = 2;

/// Dispatch output to the appropriate formatter.
///
/// Commands return either a computation envelope (`result` object) or a row
/// view (`results` array of records in column order).
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value as plain text.
pub(crate) fn scalar_text(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Like [`scalar_text`], but decimal strings are rounded for display.
pub(crate) fn display_text(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => match s.parse::<Decimal>() {
            Ok(d) if d.scale() > DISPLAY_DP => d.round_dp(DISPLAY_DP).to_string(),
            _ => s.clone(),
        },
        Value::Array(arr) => arr
            .iter()
            .map(|v| display_text(v, null))
            .collect::<Vec<_>>()
            .join(", "),
        _ => scalar_text(value, null),
    }
}
