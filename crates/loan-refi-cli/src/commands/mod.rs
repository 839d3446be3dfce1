pub mod amortization;
pub mod refinance;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use loan_refi_core::{ComputationOutput, LoanTerms};

pub type CommandResult = Result<Value, Box<dyn std::error::Error>>;

/// Which part of a computation to print.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum View {
    /// The complete envelope
    #[default]
    Full,
    /// Totals only
    Summary,
    /// One row per record (schedule payments, scenarios)
    Rows,
    /// One row per loan year (schedules only)
    Annual,
}

/// Build terms from individual flags, naming the first one missing.
pub(crate) fn terms_from_flags(
    principal: Option<Decimal>,
    rate: Option<Decimal>,
    term: Option<Decimal>,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    Ok(LoanTerms::new(
        principal.ok_or("--principal is required (or provide --input)")?,
        rate.ok_or("--rate is required (or provide --input)")?,
        term.ok_or("--term is required (or provide --input)")?,
    ))
}

/// A row view: records plus the envelope's warnings and methodology.
pub(crate) fn rows_view<T: Serialize, R: Serialize>(
    output: &ComputationOutput<T>,
    rows: &[R],
) -> CommandResult {
    Ok(json!({
        "results": serde_json::to_value(rows)?,
        "warnings": output.warnings,
        "methodology": output.methodology,
    }))
}

/// The envelope with `result` replaced by one of its parts.
pub(crate) fn part_view<T: Serialize, P: Serialize>(
    output: &ComputationOutput<T>,
    part: &P,
) -> CommandResult {
    let mut value = serde_json::to_value(output)?;
    value["result"] = serde_json::to_value(part)?;
    Ok(value)
}
