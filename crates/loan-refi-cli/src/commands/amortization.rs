use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};

use loan_refi_core::amortization::{
    self, monthly_rate, payment_formula, total_periods, AmortizationInput,
};
use loan_refi_core::LoanTerms;

use super::{part_view, rows_view, terms_from_flags, CommandResult, View};
use crate::input;

/// Arguments for the fixed monthly payment
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PaymentArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (5.49 = 5.49%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years, fractional allowed (27.5)
    #[arg(long)]
    pub term: Option<Decimal>,
}

/// Arguments for a full amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub term: Option<Decimal>,

    /// First payment date (YYYY-MM-DD), used for labels only
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Part of the result to print
    #[arg(long, value_enum, default_value_t = View::Full)]
    pub view: View,
}

/// Arguments for the spreadsheet payment formula
#[derive(Args)]
pub struct FormulaArgs {
    /// Cell holding the principal
    #[arg(long, default_value = "B2")]
    pub principal_cell: String,

    /// Cell holding the annual rate in percent
    #[arg(long, default_value = "B3")]
    pub rate_cell: String,

    /// Cell holding the term in years
    #[arg(long, default_value = "B4")]
    pub term_cell: String,
}

pub fn run_payment(args: PaymentArgs) -> CommandResult {
    let terms: LoanTerms = if args.input.is_none() && args.principal.is_some() {
        terms_from_flags(args.principal, args.rate, args.term)?
    } else if let Some(terms) = input::load(args.input.as_deref())? {
        terms
    } else {
        terms_from_flags(args.principal, args.rate, args.term)?
    };
    debug!(
        principal = %terms.principal,
        annual_rate = %terms.annual_rate,
        term_years = %terms.term_years,
        "computing monthly payment"
    );

    let payment = amortization::monthly_payment(&terms)?;
    Ok(json!({
        "result": {
            "monthly_payment": payment,
            "total_periods": total_periods(terms.term_years)?,
            "monthly_rate": monthly_rate(terms.annual_rate),
        }
    }))
}

pub fn run_schedule(args: ScheduleArgs) -> CommandResult {
    let sched_input: AmortizationInput = if args.input.is_none() && args.principal.is_some() {
        AmortizationInput {
            terms: terms_from_flags(args.principal, args.rate, args.term)?,
            start_date: args.start_date,
        }
    } else if let Some(mut loaded) = input::load::<AmortizationInput>(args.input.as_deref())? {
        if args.start_date.is_some() {
            loaded.start_date = args.start_date;
        }
        loaded
    } else {
        return Err("--input <file> or --principal/--rate/--term required for schedule".into());
    };

    let output = amortization::amortize(&sched_input)?;
    info!(
        periods = output.result.schedule.len(),
        elapsed_us = output.metadata.computation_time_us,
        "schedule generated"
    );
    for w in &output.warnings {
        debug!(warning = %w, "schedule warning");
    }

    match args.view {
        View::Full => Ok(serde_json::to_value(output)?),
        View::Summary => part_view(&output, &output.result.summary),
        View::Rows => rows_view(&output, &output.result.schedule),
        View::Annual => rows_view(&output, &output.result.annual_summaries),
    }
}

pub fn run_formula(args: FormulaArgs) -> CommandResult {
    let formula = payment_formula(&args.principal_cell, &args.rate_cell, &args.term_cell);
    Ok(json!({ "result": { "formula": formula } }))
}
