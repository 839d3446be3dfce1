//! Current-versus-proposed payment delta and breakeven.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::amortization::payment::monthly_payment;
use crate::amortization::summary::lifetime_interest;
use crate::error::LoanRefiError;
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money, Percent, Years};
use crate::LoanRefiResult;

const NOT_APPLICABLE: &str = "N/A";

/// Periods of savings needed to recover a one-time cost.
///
/// `NotApplicable` when the proposal does not save money each month; it is
/// never represented as zero, a negative count, or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakeven {
    /// Raw `cost / monthly_savings`, not rounded.
    Periods(Decimal),
    NotApplicable,
}

impl Breakeven {
    pub fn from_savings(one_time_cost: Money, monthly_savings: Money) -> LoanRefiResult<Self> {
        if monthly_savings <= Decimal::ZERO {
            return Ok(Breakeven::NotApplicable);
        }
        one_time_cost
            .checked_div(monthly_savings)
            .map(Breakeven::Periods)
            .ok_or_else(|| LoanRefiError::Overflow {
                context: format!("breakeven {one_time_cost} / {monthly_savings}"),
            })
    }

    pub fn periods(&self) -> Option<Decimal> {
        match self {
            Breakeven::Periods(p) => Some(*p),
            Breakeven::NotApplicable => None,
        }
    }

    /// Whole months needed, rounding any partial month up.
    pub fn whole_periods(&self) -> Option<u32> {
        self.periods().and_then(|p| p.ceil().to_u32())
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Breakeven::Periods(_))
    }
}

impl fmt::Display for Breakeven {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breakeven::Periods(p) => write!(f, "{:.1} months", p.round_dp(1)),
            Breakeven::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl Serialize for Breakeven {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Breakeven::Periods(p) => Serialize::serialize(p, serializer),
            Breakeven::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Breakeven {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Periods(Decimal),
            Label(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Periods(p) => Ok(Breakeven::Periods(p)),
            Repr::Label(s) if s == NOT_APPLICABLE => Ok(Breakeven::NotApplicable),
            Repr::Label(s) => Err(de::Error::custom(format!(
                "expected a period count or \"{NOT_APPLICABLE}\", got \"{s}\""
            ))),
        }
    }
}

/// Optional replacement rate and/or term for an existing loan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_years: Option<Years>,
}

impl TermsOverride {
    pub fn apply(&self, terms: &LoanTerms) -> LoanTerms {
        terms.with_overrides(self.annual_rate, self.term_years)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    pub current_payment: Money,
    pub proposed_payment: Money,
    /// Positive when the proposal is cheaper each month.
    pub monthly_savings: Money,
    pub annual_savings: Money,
    pub one_time_cost: Money,
    pub breakeven_periods: Breakeven,
}

/// Payment delta between two sets of terms and the periods needed to
/// recover `one_time_cost` from the monthly savings.
pub fn scenario_delta(
    current: &LoanTerms,
    proposed: &LoanTerms,
    one_time_cost: Money,
) -> LoanRefiResult<ScenarioDelta> {
    let current_payment = monthly_payment(current)?;
    let proposed_payment = monthly_payment(proposed)?;
    delta_from_payments(current_payment, proposed_payment, one_time_cost)
}

/// Same as [`scenario_delta`] for payments that are already known.
pub fn delta_from_payments(
    current_payment: Money,
    proposed_payment: Money,
    one_time_cost: Money,
) -> LoanRefiResult<ScenarioDelta> {
    validate_cost("one_time_cost", one_time_cost)?;
    let monthly_savings = current_payment - proposed_payment;
    Ok(ScenarioDelta {
        current_payment,
        proposed_payment,
        monthly_savings,
        annual_savings: monthly_savings * dec!(12),
        one_time_cost,
        breakeven_periods: Breakeven::from_savings(one_time_cost, monthly_savings)?,
    })
}

pub(crate) fn validate_cost(field: &str, cost: Money) -> LoanRefiResult<()> {
    if cost < Decimal::ZERO {
        return Err(LoanRefiError::invalid(field, "Cost cannot be negative"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Full comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current: LoanTerms,
    pub proposed: LoanTerms,
    #[serde(default)]
    pub one_time_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceComparison {
    #[serde(flatten)]
    pub delta: ScenarioDelta,
    pub current_lifetime_interest: Money,
    pub proposed_lifetime_interest: Money,
    /// Current minus proposed; negative when the proposal costs more interest.
    pub lifetime_interest_saved: Money,
    /// Interest saved net of the one-time cost.
    pub net_lifetime_saving: Money,
}

/// Compare keeping the current loan against refinancing into `proposed`.
pub fn compare_refinance(
    input: &RefinanceInput,
) -> LoanRefiResult<ComputationOutput<RefinanceComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let delta = scenario_delta(&input.current, &input.proposed, input.one_time_cost)?;
    let current_lifetime_interest = lifetime_interest(&input.current)?;
    let proposed_lifetime_interest = lifetime_interest(&input.proposed)?;
    let lifetime_interest_saved = current_lifetime_interest - proposed_lifetime_interest;

    if delta.monthly_savings < Decimal::ZERO {
        warnings.push(format!(
            "Proposed payment is {:.2} higher per month",
            -delta.monthly_savings
        ));
    }
    if input.proposed.principal != input.current.principal {
        warnings.push("Proposed principal differs from current principal".into());
    }
    if lifetime_interest_saved < Decimal::ZERO && delta.monthly_savings > Decimal::ZERO {
        warnings.push(
            "Lower payment comes from a longer term: lifetime interest increases".into(),
        );
    }

    let output = RefinanceComparison {
        net_lifetime_saving: lifetime_interest_saved - input.one_time_cost,
        delta,
        current_lifetime_interest,
        proposed_lifetime_interest,
        lifetime_interest_saved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance Payment Delta and Breakeven",
        input,
        warnings,
        elapsed,
        output,
    ))
}
