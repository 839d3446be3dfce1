//! Month-by-month amortization schedule.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{monthly_payment, monthly_rate, total_periods};
use crate::error::LoanRefiError;
use crate::types::{LoanTerms, Money};
use crate::LoanRefiResult;

/// One payment period. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-based period index.
    pub payment_number: u32,
    /// Calendar label, present only when a start date was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    /// Running sum of `interest_portion` up to and including this period.
    pub cumulative_interest: Money,
}

/// Records ordered by `payment_number`.
pub type AmortizationSchedule = Vec<PaymentRecord>;

/// Build the full schedule for `terms`.
///
/// The loop is bounded by the rounded period count and also stops as soon
/// as the balance is paid off. The last record absorbs whatever residual
/// the running balance carries at that point, so its principal portion is
/// exactly the remaining balance and its ending balance is exactly zero.
pub fn generate_schedule(
    terms: &LoanTerms,
    start_date: Option<NaiveDate>,
) -> LoanRefiResult<AmortizationSchedule> {
    let payment = monthly_payment(terms)?;
    let n = total_periods(terms.term_years)?;
    let r = monthly_rate(terms.annual_rate);

    let mut schedule = Vec::with_capacity(n as usize);
    let mut balance = terms.principal;
    let mut cumulative_interest = Decimal::ZERO;
    let mut period: u32 = 1;

    while period <= n && balance > Decimal::ZERO {
        let interest = balance * r;
        let mut payment_amount = payment;
        let mut principal_portion = payment - interest;
        let new_balance = balance - principal_portion;

        let is_final = period == n || new_balance <= Decimal::ZERO;
        if is_final {
            principal_portion = balance;
            payment_amount = balance + interest;
        }
        cumulative_interest += interest;

        let date = start_date
            .map(|d| label_date(d, period - 1))
            .transpose()?;

        let ending_balance = if is_final {
            Decimal::ZERO
        } else {
            new_balance.max(Decimal::ZERO)
        };

        schedule.push(PaymentRecord {
            payment_number: period,
            date,
            beginning_balance: balance,
            payment_amount,
            principal_portion,
            interest_portion: interest,
            ending_balance,
            cumulative_interest,
        });

        if is_final {
            break;
        }
        balance = ending_balance;
        period += 1;
    }

    Ok(schedule)
}

/// `start + offset` calendar months; day of month is kept, or clamped to
/// the last day when the target month is shorter.
fn label_date(start: NaiveDate, offset: u32) -> LoanRefiResult<NaiveDate> {
    start
        .checked_add_months(Months::new(offset))
        .ok_or_else(|| {
            LoanRefiError::invalid(
                "start_date",
                format!("{start} + {offset} months is outside the supported date range"),
            )
        })
}
