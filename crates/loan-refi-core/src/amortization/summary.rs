//! Schedule totals, loan-year roll-ups, and the `amortize` entry point.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::payment::{monthly_payment, total_periods};
use super::schedule::{generate_schedule, AmortizationSchedule, PaymentRecord};
use crate::types::{with_metadata, ComputationOutput, LoanTerms, Money};
use crate::LoanRefiResult;

/// Terms above this many years get a warning.
const LONG_TERM_YEARS: Decimal = dec!(40);

/// Annual rates above this percentage get a warning.
const HIGH_RATE_PERCENT: Decimal = dec!(25);

/// Input for a full amortization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    /// First payment date; labels only, never affects the math.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Life-of-loan totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub monthly_payment: Money,
    /// Nominal period count, round(term_years * 12).
    pub total_periods: u32,
    /// Records actually emitted.
    pub actual_periods: u32,
    pub total_paid: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

/// Totals for one loan year (12 payments; the last year may be partial).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: u32,
    pub payments: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub terms: LoanTerms,
    pub summary: ScheduleSummary,
    pub annual_summaries: Vec<AnnualSummary>,
    pub schedule: AmortizationSchedule,
}

/// Compute payment, schedule, and roll-ups for one loan.
pub fn amortize(
    input: &AmortizationInput,
) -> LoanRefiResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = generate_schedule(&input.terms, input.start_date)?;
    let summary = summarize(&input.terms, &schedule)?;
    let annual_summaries = annual_summaries(&schedule);

    if input.terms.term_years > LONG_TERM_YEARS {
        warnings.push(format!(
            "Term of {} years exceeds {LONG_TERM_YEARS} years",
            input.terms.term_years
        ));
    }
    if input.terms.annual_rate > HIGH_RATE_PERCENT {
        warnings.push(format!(
            "Annual rate of {}% is unusually high",
            input.terms.annual_rate
        ));
    }
    if input.terms.annual_rate.is_zero() {
        warnings.push("Zero rate: payments are straight-line principal".into());
    }
    if summary.actual_periods < summary.total_periods {
        warnings.push(format!(
            "Loan pays off after {} of {} periods",
            summary.actual_periods, summary.total_periods
        ));
    }

    let output = AmortizationOutput {
        terms: input.terms.clone(),
        summary,
        annual_summaries,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Level-Payment Amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Totals over a schedule generated from `terms`.
pub fn summarize(
    terms: &LoanTerms,
    schedule: &[PaymentRecord],
) -> LoanRefiResult<ScheduleSummary> {
    let total_paid: Money = schedule.iter().map(|r| r.payment_amount).sum();
    let total_principal: Money = schedule.iter().map(|r| r.principal_portion).sum();
    let total_interest = schedule
        .last()
        .map(|r| r.cumulative_interest)
        .unwrap_or(Decimal::ZERO);

    Ok(ScheduleSummary {
        monthly_payment: monthly_payment(terms)?,
        total_periods: total_periods(terms.term_years)?,
        actual_periods: schedule.len() as u32,
        total_paid,
        total_principal,
        total_interest,
        payoff_date: schedule.last().and_then(|r| r.date),
    })
}

/// Lifetime interest for `terms`, summed from its schedule.
pub fn lifetime_interest(terms: &LoanTerms) -> LoanRefiResult<Money> {
    let schedule = generate_schedule(terms, None)?;
    Ok(schedule
        .last()
        .map(|r| r.cumulative_interest)
        .unwrap_or(Decimal::ZERO))
}

/// Group a schedule into loan years.
pub fn annual_summaries(schedule: &[PaymentRecord]) -> Vec<AnnualSummary> {
    schedule
        .chunks(12)
        .enumerate()
        .filter_map(|(idx, year)| {
            let last = year.last()?;
            Some(AnnualSummary {
                year: idx as u32 + 1,
                payments: year.len() as u32,
                principal_paid: year.iter().map(|r| r.principal_portion).sum(),
                interest_paid: year.iter().map(|r| r.interest_portion).sum(),
                ending_balance: last.ending_balance,
                cumulative_interest: last.cumulative_interest,
            })
        })
        .collect()
}
