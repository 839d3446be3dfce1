//! Independent refinance decisions per loan, with combined totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

use super::delta::{delta_from_payments, validate_cost, Breakeven, TermsOverride};
use crate::amortization::payment::monthly_payment;
use crate::error::LoanRefiError;
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money};
use crate::LoanRefiResult;

/// A refinance offer for one loan. The principal carries over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceOffer {
    #[serde(flatten)]
    pub terms: TermsOverride,
    #[serde(default)]
    pub costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDecision {
    pub name: String,
    pub current: LoanTerms,
    /// `None` keeps the loan as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinance: Option<RefinanceOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionInput {
    pub loans: Vec<LoanDecision>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDecisionResult {
    pub name: String,
    pub refinanced: bool,
    pub current_payment: Money,
    pub new_payment: Money,
    pub monthly_savings: Money,
    pub refi_costs: Money,
    pub breakeven_periods: Breakeven,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutput {
    pub loans: Vec<LoanDecisionResult>,
    pub current_total_payment: Money,
    pub new_total_payment: Money,
    pub total_monthly_savings: Money,
    pub total_refi_costs: Money,
    pub combined_breakeven_periods: Breakeven,
}

/// Evaluate each loan's keep-or-refinance choice and the combined result.
pub fn evaluate_decisions(
    input: &DecisionInput,
) -> LoanRefiResult<ComputationOutput<DecisionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_decisions(input)?;

    let mut loans = Vec::with_capacity(input.loans.len());
    for loan in &input.loans {
        let current_payment = monthly_payment(&loan.current)?;
        let (new_payment, costs) = match &loan.refinance {
            Some(offer) => (monthly_payment(&offer.terms.apply(&loan.current))?, offer.costs),
            None => (current_payment, Decimal::ZERO),
        };
        let delta = delta_from_payments(current_payment, new_payment, costs)?;

        if loan.refinance.is_some() && delta.monthly_savings < Decimal::ZERO {
            warnings.push(format!(
                "{}: refinancing raises the payment by {:.2}",
                loan.name, -delta.monthly_savings
            ));
        }

        loans.push(LoanDecisionResult {
            name: loan.name.clone(),
            refinanced: loan.refinance.is_some(),
            current_payment,
            new_payment,
            monthly_savings: delta.monthly_savings,
            refi_costs: costs,
            breakeven_periods: delta.breakeven_periods,
        });
    }

    let current_total_payment: Money = loans.iter().map(|l| l.current_payment).sum();
    let new_total_payment: Money = loans.iter().map(|l| l.new_payment).sum();
    let total_refi_costs: Money = loans.iter().map(|l| l.refi_costs).sum();
    let total_monthly_savings = current_total_payment - new_total_payment;

    let output = DecisionOutput {
        loans,
        current_total_payment,
        new_total_payment,
        total_monthly_savings,
        total_refi_costs,
        combined_breakeven_periods: Breakeven::from_savings(
            total_refi_costs,
            total_monthly_savings,
        )?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Independent Refinance Decisions",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_decisions(input: &DecisionInput) -> LoanRefiResult<()> {
    if input.loans.is_empty() {
        return Err(LoanRefiError::invalid("loans", "At least one loan is required"));
    }
    let mut seen = BTreeSet::new();
    for loan in &input.loans {
        if !seen.insert(loan.name.as_str()) {
            return Err(LoanRefiError::invalid(
                "loans",
                format!("Duplicate loan name '{}'", loan.name),
            ));
        }
        if let Some(offer) = &loan.refinance {
            validate_cost("costs", offer.costs)?;
        }
    }
    Ok(())
}
