mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::amortization::{FormulaArgs, PaymentArgs, ScheduleArgs};
use commands::refinance::{CompareArgs, DecideArgs, PortfolioArgs};

/// Fixed-rate loan amortization and refinance comparisons
#[derive(Parser)]
#[command(
    name = "loanrefi",
    version,
    about = "Fixed-rate loan amortization and refinance comparisons",
    long_about = "Computes level monthly payments and month-by-month amortization \
                  schedules for fixed-rate loans, and compares current terms against \
                  refinance offers with breakeven analysis across a small portfolio."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed monthly payment for a loan
    Payment(PaymentArgs),
    /// Full amortization schedule with yearly roll-ups
    Schedule(ScheduleArgs),
    /// Compare current terms against a refinance offer
    Compare(CompareArgs),
    /// Evaluate independent keep-or-refinance decisions per loan
    Decide(DecideArgs),
    /// Price refinance scenarios across the loan portfolio
    Portfolio(PortfolioArgs),
    /// Print the spreadsheet formula equivalent to the payment calculation
    Formula(FormulaArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: commands::CommandResult = match cli.command {
        Commands::Payment(args) => commands::amortization::run_payment(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Compare(args) => commands::refinance::run_compare(args),
        Commands::Decide(args) => commands::refinance::run_decide(args),
        Commands::Portfolio(args) => commands::refinance::run_portfolio(args),
        Commands::Formula(args) => commands::amortization::run_formula(args),
        Commands::Version => {
            println!("loanrefi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(format = ?cli.output, "writing output");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_schedule_flags() {
        let cli = Cli::try_parse_from([
            "loanrefi",
            "schedule",
            "--principal",
            "220000",
            "--rate",
            "6.49",
            "--term",
            "27.5",
            "--start-date",
            "2025-01-01",
            "--view",
            "annual",
            "--output",
            "csv",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Csv));
        match cli.command {
            Commands::Schedule(args) => {
                assert_eq!(args.term, Some(rust_decimal_macros::dec!(27.5)));
                assert!(matches!(args.view, commands::View::Annual));
                assert!(args.start_date.is_some());
            }
            _ => panic!("expected schedule"),
        }
    }

    #[test]
    fn test_payment_from_flags() {
        let cli = Cli::try_parse_from([
            "loanrefi", "payment", "--principal", "120000", "--rate", "0", "--term", "10",
        ])
        .unwrap();
        let Commands::Payment(args) = cli.command else {
            panic!("expected payment");
        };
        let value = commands::amortization::run_payment(args).unwrap();
        let payment: rust_decimal::Decimal = value["result"]["monthly_payment"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(payment, rust_decimal_macros::dec!(1000));
        assert_eq!(value["result"]["total_periods"], serde_json::json!(120));
    }

    #[test]
    fn test_compare_from_flags_not_applicable() {
        let cli = Cli::try_parse_from([
            "loanrefi", "compare", "--principal", "220000", "--rate", "6.49", "--term", "27.5",
            "--new-rate", "6.49", "--new-term", "15", "--cost", "2000",
        ])
        .unwrap();
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        let value = commands::refinance::run_compare(args).unwrap();
        assert_eq!(value["result"]["breakeven_periods"], serde_json::json!("N/A"));
    }

    #[test]
    fn test_compare_term_only_change() {
        let cli = Cli::try_parse_from([
            "loanrefi", "compare", "--principal", "300000", "--rate", "5", "--term", "20",
            "--new-term", "30",
        ])
        .unwrap();
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        let value = commands::refinance::run_compare(args).unwrap();
        let savings: rust_decimal::Decimal = value["result"]["monthly_savings"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(savings > rust_decimal::Decimal::ZERO);
        let breakeven: rust_decimal::Decimal = value["result"]["breakeven_periods"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(breakeven.is_zero());
    }

    #[test]
    fn test_compare_without_new_terms_rejected() {
        let cli = Cli::try_parse_from([
            "loanrefi", "compare", "--principal", "300000", "--rate", "5", "--term", "20",
        ])
        .unwrap();
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        let err = commands::refinance::run_compare(args).unwrap_err();
        assert!(err.to_string().contains("--new-term"));
    }

    #[test]
    fn test_formula_command() {
        let value = commands::amortization::run_formula(FormulaArgs {
            principal_cell: "C5".into(),
            rate_cell: "C6".into(),
            term_cell: "C7".into(),
        })
        .unwrap();
        let formula = value["result"]["formula"].as_str().unwrap();
        assert!(formula.contains("ROUND(C7*12,0)"));
    }
}
