use clap::Args;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use loan_refi_core::refinance::{
    analyze_portfolio, compare_refinance, default_portfolio, evaluate_decisions, DecisionInput,
    PortfolioInput, RefinanceInput,
};

use super::{part_view, rows_view, terms_from_flags, CommandResult, View};
use crate::input;

/// Arguments for a current-versus-proposed comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CompareArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current principal (kept for the proposed loan)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Current annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Current term in years
    #[arg(long)]
    pub term: Option<Decimal>,

    /// Proposed annual rate in percent (defaults to the current rate)
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Proposed term in years (defaults to the current term)
    #[arg(long)]
    pub new_term: Option<Decimal>,

    /// One-time refinance cost
    #[arg(long, default_value = "0")]
    pub cost: Decimal,
}

/// Arguments for independent per-loan refinance decisions
#[derive(Args)]
pub struct DecideArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for portfolio scenario analysis
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON/YAML portfolio file; the built-in portfolio is used when absent
    #[arg(long)]
    pub input: Option<String>,

    /// Part of the result to print
    #[arg(long, value_enum, default_value_t = View::Full)]
    pub view: View,
}

pub fn run_compare(args: CompareArgs) -> CommandResult {
    let cmp_input: RefinanceInput = if args.input.is_none() && args.principal.is_some() {
        let current = terms_from_flags(args.principal, args.rate, args.term)?;
        if args.new_rate.is_none() && args.new_term.is_none() {
            return Err("--new-rate and/or --new-term is required (or provide --input)".into());
        }
        RefinanceInput {
            proposed: current.with_overrides(args.new_rate, args.new_term),
            current,
            one_time_cost: args.cost,
        }
    } else if let Some(loaded) = input::load(args.input.as_deref())? {
        loaded
    } else {
        return Err("--input <file> or --principal/--rate/--term/--new-rate required".into());
    };

    let output = compare_refinance(&cmp_input)?;
    info!(
        monthly_savings = %output.result.delta.monthly_savings,
        breakeven = %output.result.delta.breakeven_periods,
        "refinance compared"
    );
    for w in &output.warnings {
        warn!("{}", w);
    }
    Ok(serde_json::to_value(output)?)
}

pub fn run_decide(args: DecideArgs) -> CommandResult {
    let decision_input: DecisionInput = input::load(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for refinance decisions")?;

    let output = evaluate_decisions(&decision_input)?;
    info!(
        loans = output.result.loans.len(),
        combined_breakeven = %output.result.combined_breakeven_periods,
        "decisions evaluated"
    );
    for w in &output.warnings {
        warn!("{}", w);
    }
    Ok(serde_json::to_value(output)?)
}

pub fn run_portfolio(args: PortfolioArgs) -> CommandResult {
    let portfolio: PortfolioInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => {
            debug!("no portfolio input given, using built-in portfolio");
            default_portfolio()
        }
    };

    let output = analyze_portfolio(&portfolio)?;
    info!(
        loans = output.result.summary.loans.len(),
        scenarios = output.result.scenarios.len(),
        elapsed_us = output.metadata.computation_time_us,
        "portfolio analysed"
    );

    match args.view {
        View::Full => Ok(serde_json::to_value(output)?),
        View::Summary => part_view(&output, &output.result.summary),
        View::Rows | View::Annual => rows_view(&output, &output.result.scenarios),
    }
}
