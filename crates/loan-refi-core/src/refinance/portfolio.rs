//! Multi-scenario refinance analysis across a small loan portfolio.
//!
//! A portfolio is a handful of named loans (typically an owner-occupied
//! unit and an investment property). Each scenario re-prices some or all
//! loans at new rates and/or terms, keeps every principal, and is compared
//! against the current total payment. The first output row is always the
//! `Current` baseline.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use super::delta::{delta_from_payments, validate_cost, Breakeven, TermsOverride};
use crate::amortization::payment::monthly_payment;
use crate::amortization::summary::lifetime_interest;
use crate::error::LoanRefiError;
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money, Percent, Years};
use crate::LoanRefiResult;

/// Refinance cost assumed when a scenario does not state one.
const DEFAULT_REFI_COSTS: Money = dec!(5000);

/// Label of the baseline row.
pub const CURRENT_SCENARIO: &str = "Current";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanKind {
    OwnerOccupied,
    Investment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioLoan {
    pub name: String,
    pub kind: LoanKind,
    #[serde(flatten)]
    pub terms: LoanTerms,
}

fn default_refi_costs() -> Money {
    DEFAULT_REFI_COSTS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceScenario {
    pub name: String,
    /// Per-loan overrides keyed by loan name; loans not listed keep their terms.
    #[serde(default)]
    pub overrides: BTreeMap<String, TermsOverride>,
    #[serde(default = "default_refi_costs")]
    pub refi_costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub loans: Vec<PortfolioLoan>,
    #[serde(default)]
    pub scenarios: Vec<RefinanceScenario>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSnapshot {
    pub name: String,
    pub kind: LoanKind,
    pub principal: Money,
    pub annual_rate: Percent,
    pub term_years: Years,
    pub monthly_payment: Money,
    pub lifetime_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_principal: Money,
    pub total_monthly_payment: Money,
    /// Principal-weighted average annual rate, in percent.
    pub weighted_average_rate: Percent,
    pub total_lifetime_interest: Money,
    pub loans: Vec<LoanSnapshot>,
}

/// One loan as priced under a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioLoan {
    pub name: String,
    pub annual_rate: Percent,
    pub term_years: Years,
    pub monthly_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRow {
    pub scenario: String,
    pub loans: Vec<ScenarioLoan>,
    pub total_payment: Money,
    pub monthly_savings: Money,
    pub annual_savings: Money,
    pub refi_costs: Money,
    pub breakeven_periods: Breakeven,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOutput {
    pub summary: PortfolioSummary,
    pub scenarios: Vec<ScenarioRow>,
}

/// Summarise the portfolio and price every scenario against it.
pub fn analyze_portfolio(
    input: &PortfolioInput,
) -> LoanRefiResult<ComputationOutput<PortfolioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_portfolio(input)?;

    let summary = summarize_portfolio(&input.loans)?;
    let current_total = summary.total_monthly_payment;

    let mut scenarios = Vec::with_capacity(input.scenarios.len() + 1);
    scenarios.push(ScenarioRow {
        scenario: CURRENT_SCENARIO.to_string(),
        loans: summary
            .loans
            .iter()
            .map(|l| ScenarioLoan {
                name: l.name.clone(),
                annual_rate: l.annual_rate,
                term_years: l.term_years,
                monthly_payment: l.monthly_payment,
            })
            .collect(),
        total_payment: current_total,
        monthly_savings: Decimal::ZERO,
        annual_savings: Decimal::ZERO,
        refi_costs: Decimal::ZERO,
        breakeven_periods: Breakeven::NotApplicable,
    });

    for scenario in &input.scenarios {
        let row = price_scenario(&input.loans, scenario, current_total)?;
        if !row.breakeven_periods.is_applicable() {
            warnings.push(format!(
                "{}: no monthly savings, breakeven not applicable",
                row.scenario
            ));
        }
        scenarios.push(row);
    }

    let output = PortfolioOutput { summary, scenarios };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio Refinance Scenario Analysis",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn summarize_portfolio(loans: &[PortfolioLoan]) -> LoanRefiResult<PortfolioSummary> {
    let mut snapshots = Vec::with_capacity(loans.len());
    for loan in loans {
        snapshots.push(LoanSnapshot {
            name: loan.name.clone(),
            kind: loan.kind,
            principal: loan.terms.principal,
            annual_rate: loan.terms.annual_rate,
            term_years: loan.terms.term_years,
            monthly_payment: monthly_payment(&loan.terms)?,
            lifetime_interest: lifetime_interest(&loan.terms)?,
        });
    }

    let total_principal: Money = snapshots.iter().map(|s| s.principal).sum();
    let weighted: Decimal = snapshots.iter().map(|s| s.principal * s.annual_rate).sum();

    Ok(PortfolioSummary {
        total_principal,
        total_monthly_payment: snapshots.iter().map(|s| s.monthly_payment).sum(),
        // validation guarantees a positive total principal
        weighted_average_rate: weighted / total_principal,
        total_lifetime_interest: snapshots.iter().map(|s| s.lifetime_interest).sum(),
        loans: snapshots,
    })
}

fn price_scenario(
    loans: &[PortfolioLoan],
    scenario: &RefinanceScenario,
    current_total: Money,
) -> LoanRefiResult<ScenarioRow> {
    let mut priced = Vec::with_capacity(loans.len());
    for loan in loans {
        let terms = match scenario.overrides.get(&loan.name) {
            Some(ov) => ov.apply(&loan.terms),
            None => loan.terms.clone(),
        };
        priced.push(ScenarioLoan {
            name: loan.name.clone(),
            annual_rate: terms.annual_rate,
            term_years: terms.term_years,
            monthly_payment: monthly_payment(&terms)?,
        });
    }

    let total_payment: Money = priced.iter().map(|l| l.monthly_payment).sum();
    let delta = delta_from_payments(current_total, total_payment, scenario.refi_costs)?;

    Ok(ScenarioRow {
        scenario: scenario.name.clone(),
        loans: priced,
        total_payment,
        monthly_savings: delta.monthly_savings,
        annual_savings: delta.annual_savings,
        refi_costs: scenario.refi_costs,
        breakeven_periods: delta.breakeven_periods,
    })
}

fn validate_portfolio(input: &PortfolioInput) -> LoanRefiResult<()> {
    if input.loans.is_empty() {
        return Err(LoanRefiError::invalid("loans", "At least one loan is required"));
    }
    let mut names = BTreeSet::new();
    for loan in &input.loans {
        loan.terms.validate()?;
        if !names.insert(loan.name.as_str()) {
            return Err(LoanRefiError::invalid(
                "loans",
                format!("Duplicate loan name '{}'", loan.name),
            ));
        }
    }
    for scenario in &input.scenarios {
        validate_cost("refi_costs", scenario.refi_costs)?;
        if let Some(unknown) = scenario
            .overrides
            .keys()
            .find(|k| !names.contains(k.as_str()))
        {
            return Err(LoanRefiError::invalid(
                "overrides",
                format!(
                    "Scenario '{}' overrides unknown loan '{}'",
                    scenario.name, unknown
                ),
            ));
        }
    }
    Ok(())
}

/// The owner-occupied unit and investment property with three sample
/// rate scenarios.
pub fn default_portfolio() -> PortfolioInput {
    let scenario = |name: &str, apt_rate: Decimal, inv_rate: Decimal, costs: Decimal| {
        let rate = |r| TermsOverride {
            annual_rate: Some(r),
            term_years: None,
        };
        RefinanceScenario {
            name: name.to_string(),
            overrides: BTreeMap::from([
                ("apartment".to_string(), rate(apt_rate)),
                ("investment".to_string(), rate(inv_rate)),
            ]),
            refi_costs: costs,
        }
    };

    PortfolioInput {
        loans: vec![
            PortfolioLoan {
                name: "apartment".into(),
                kind: LoanKind::OwnerOccupied,
                terms: LoanTerms::new(dec!(555_000), dec!(5.49), dec!(27)),
            },
            PortfolioLoan {
                name: "investment".into(),
                kind: LoanKind::Investment,
                terms: LoanTerms::new(dec!(220_000), dec!(6.49), dec!(27.5)),
            },
        ],
        scenarios: vec![
            scenario("Scenario 1", dec!(4.99), dec!(5.99), dec!(5000)),
            scenario("Scenario 2", dec!(5.25), dec!(6.25), dec!(4000)),
            scenario("Scenario 3", dec!(4.75), dec!(5.75), dec!(6000)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_portfolio_baseline_first() {
        let out = analyze_portfolio(&default_portfolio()).unwrap().result;
        assert_eq!(out.scenarios.len(), 4);
        let base = &out.scenarios[0];
        assert_eq!(base.scenario, CURRENT_SCENARIO);
        assert_eq!(base.monthly_savings, Decimal::ZERO);
        assert_eq!(base.breakeven_periods, Breakeven::NotApplicable);
        assert_eq!(base.total_payment, out.summary.total_monthly_payment);
    }

    #[test]
    fn test_lower_rate_scenarios_save() {
        let out = analyze_portfolio(&default_portfolio()).unwrap().result;
        for row in &out.scenarios[1..] {
            assert!(row.monthly_savings > Decimal::ZERO, "{}", row.scenario);
            assert_eq!(row.annual_savings, row.monthly_savings * dec!(12));
            assert_eq!(
                row.breakeven_periods,
                Breakeven::Periods(row.refi_costs / row.monthly_savings)
            );
        }
        // lowest rates save the most
        assert!(out.scenarios[3].monthly_savings > out.scenarios[1].monthly_savings);
        assert!(out.scenarios[1].monthly_savings > out.scenarios[2].monthly_savings);
    }

    #[test]
    fn test_weighted_average_rate() {
        let out = analyze_portfolio(&default_portfolio()).unwrap().result;
        let expected = (dec!(555_000) * dec!(5.49) + dec!(220_000) * dec!(6.49)) / dec!(775_000);
        assert_eq!(out.summary.weighted_average_rate, expected);
        assert_eq!(out.summary.total_principal, dec!(775_000));
    }

    #[test]
    fn test_partial_override_keeps_other_loan() {
        let mut input = default_portfolio();
        input.scenarios = vec![RefinanceScenario {
            name: "apartment only".into(),
            overrides: BTreeMap::from([(
                "apartment".to_string(),
                TermsOverride {
                    annual_rate: Some(dec!(4.99)),
                    term_years: None,
                },
            )]),
            refi_costs: dec!(3000),
        }];
        let out = analyze_portfolio(&input).unwrap().result;
        let row = &out.scenarios[1];
        assert_eq!(row.loans[1].monthly_payment, out.summary.loans[1].monthly_payment);
        assert_eq!(row.loans[1].annual_rate, dec!(6.49));
        assert_eq!(row.loans[1].term_years, dec!(27.5));
    }

    #[test]
    fn test_unknown_override_rejected() {
        let mut input = default_portfolio();
        input.scenarios[0]
            .overrides
            .insert("boat".into(), TermsOverride::default());
        match analyze_portfolio(&input) {
            Err(LoanRefiError::InvalidArgument { field, reason }) => {
                assert_eq!(field, "overrides");
                assert!(reason.contains("boat"));
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_refi_costs_defaults() {
        let json = r#"{
            "loans": [{"name": "apartment", "kind": "owner_occupied",
                       "principal": "555000", "annual_rate": "5.49", "term_years": "27"}],
            "scenarios": [{"name": "cheaper", "overrides": {"apartment": {"annual_rate": "4.99"}}}]
        }"#;
        let input: PortfolioInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.scenarios[0].refi_costs, dec!(5000));
        let out = analyze_portfolio(&input).unwrap().result;
        assert_eq!(out.scenarios[1].refi_costs, dec!(5000));
    }

    #[test]
    fn test_higher_rate_scenario_warns() {
        let mut input = default_portfolio();
        input.scenarios = vec![RefinanceScenario {
            name: "worse".into(),
            overrides: BTreeMap::from([(
                "investment".to_string(),
                TermsOverride {
                    annual_rate: Some(dec!(8)),
                    term_years: None,
                },
            )]),
            refi_costs: dec!(1000),
        }];
        let out = analyze_portfolio(&input).unwrap();
        assert_eq!(out.result.scenarios[1].breakeven_periods, Breakeven::NotApplicable);
        assert!(out.result.scenarios[1].monthly_savings < Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }
}
