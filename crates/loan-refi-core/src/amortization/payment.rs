//! Fixed monthly payment for a level-pay, fully amortizing loan.
//!
//! This is the single implementation of the payment definition used by
//! every caller in the workspace:
//!
//! ```text
//! r = annual_rate / 100 / 12
//! n = round(term_years * 12)
//! payment = principal * r * (1 + r)^n / ((1 + r)^n - 1)      (r > 0)
//! payment = principal / (term_years * 12)                    (r = 0)
//! ```
//!
//! [`payment_formula`] renders the same definition as spreadsheet formula
//! text for collaborators that need live, recalculating cells.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LoanRefiError;
use crate::types::{LoanTerms, Money, Percent, Rate, Years};
use crate::LoanRefiResult;

pub(crate) const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Upper bound on the period count (1,000 years of monthly payments).
pub const MAX_PERIODS: u32 = 12_000;

/// Monthly periodic rate from a nominal annual percentage.
pub fn monthly_rate(annual_rate: Percent) -> Rate {
    annual_rate / dec!(100) / MONTHS_PER_YEAR
}

/// Number of monthly periods in the term, rounded to the nearest whole
/// period (27.5 years is 330 periods, never 324).
pub fn total_periods(term_years: Years) -> LoanRefiResult<u32> {
    let periods = (term_years * MONTHS_PER_YEAR)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let n = periods.to_u32().ok_or_else(|| {
        LoanRefiError::invalid(
            "term_years",
            format!("Term of {term_years} years does not resolve to a period count"),
        )
    })?;
    if n == 0 {
        return Err(LoanRefiError::invalid(
            "term_years",
            "Term must cover at least one monthly period",
        ));
    }
    if n > MAX_PERIODS {
        return Err(LoanRefiError::invalid(
            "term_years",
            format!("Term of {term_years} years exceeds {MAX_PERIODS} monthly periods"),
        ));
    }
    Ok(n)
}

/// Fixed monthly payment for the given terms.
pub fn monthly_payment(terms: &LoanTerms) -> LoanRefiResult<Money> {
    terms.validate()?;
    let n = total_periods(terms.term_years)?;

    if terms.annual_rate.is_zero() {
        return Ok(terms.principal / (terms.term_years * MONTHS_PER_YEAR));
    }

    let r = monthly_rate(terms.annual_rate);
    let growth = (Decimal::ONE + r)
        .checked_powu(u64::from(n))
        .ok_or_else(|| LoanRefiError::Overflow {
            context: format!("(1 + r)^n with n = {n}"),
        })?;
    let annuity_factor = growth - Decimal::ONE;
    if annuity_factor.is_zero() {
        return Err(LoanRefiError::DivisionByZero {
            context: "payment annuity factor".into(),
        });
    }

    terms
        .principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(annuity_factor))
        .ok_or_else(|| LoanRefiError::Overflow {
            context: "monthly payment".into(),
        })
}

/// Spreadsheet formula equivalent to [`monthly_payment`], written against
/// the given cell references (e.g. `B2`, `B3`, `B4`).
pub fn payment_formula(principal_ref: &str, rate_ref: &str, term_ref: &str) -> String {
    let r = format!("({rate_ref}/100/12)");
    let n = format!("ROUND({term_ref}*12,0)");
    format!(
        "=IF({rate_ref}=0,{principal_ref}/({term_ref}*12),\
         {principal_ref}*{r}*(1+{r})^{n}/((1+{r})^{n}-1))"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, label: &str) {
        assert!(
            (actual - expected).abs() <= tol,
            "{label}: expected ~{expected}, got {actual}"
        );
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
        assert_eq!(monthly_rate(dec!(0)), Decimal::ZERO);
    }

    #[test]
    fn test_total_periods_fractional_term() {
        assert_eq!(total_periods(dec!(27.5)).unwrap(), 330);
        assert_eq!(total_periods(dec!(30)).unwrap(), 360);
    }

    #[test]
    fn test_total_periods_rounds_to_nearest() {
        // 10.04 * 12 = 120.48 -> 120, 10.05 * 12 = 120.6 -> 121
        assert_eq!(total_periods(dec!(10.04)).unwrap(), 120);
        assert_eq!(total_periods(dec!(10.05)).unwrap(), 121);
        // exact half rounds up
        assert_eq!(total_periods(dec!(0.125)).unwrap(), 2);
    }

    #[test]
    fn test_total_periods_below_half_month_rejected() {
        assert!(total_periods(dec!(0.01)).is_err());
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let terms = LoanTerms::new(dec!(120_000), dec!(0), dec!(10));
        assert_eq!(monthly_payment(&terms).unwrap(), dec!(1000));
    }

    #[test]
    fn test_standard_payment() {
        let terms = LoanTerms::new(dec!(555_000), dec!(5.49), dec!(27));
        let pmt = monthly_payment(&terms).unwrap();
        assert_close(pmt, dec!(3288.53), dec!(0.01), "555k @ 5.49% / 27y");
    }

    #[test]
    fn test_thirty_year_textbook_payment() {
        // 200k at 6% over 30 years = 1199.10
        let terms = LoanTerms::new(dec!(200_000), dec!(6), dec!(30));
        let pmt = monthly_payment(&terms).unwrap();
        assert_close(pmt, dec!(1199.10), dec!(0.01), "200k @ 6% / 30y");
    }

    #[test]
    fn test_higher_rate_higher_payment() {
        let low = LoanTerms::new(dec!(300_000), dec!(4), dec!(25));
        let high = low.with_overrides(Some(dec!(7)), None);
        assert!(monthly_payment(&high).unwrap() > monthly_payment(&low).unwrap());
    }

    #[test]
    fn test_absurd_term_rejected() {
        assert_eq!(total_periods(dec!(1000)).unwrap(), MAX_PERIODS);
        let err = total_periods(dec!(300_000_000)).unwrap_err();
        assert!(matches!(err, LoanRefiError::InvalidArgument { ref field, .. } if field == "term_years"));
        let terms = LoanTerms::new(dec!(120_000), dec!(0), dec!(300_000_000));
        assert!(monthly_payment(&terms).is_err());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(monthly_payment(&LoanTerms::new(dec!(-1), dec!(5), dec!(30))).is_err());
        assert!(monthly_payment(&LoanTerms::new(dec!(1000), dec!(-5), dec!(30))).is_err());
        assert!(monthly_payment(&LoanTerms::new(dec!(1000), dec!(5), dec!(-30))).is_err());
    }

    #[test]
    fn test_payment_formula_text() {
        let f = payment_formula("B2", "B3", "B4");
        assert!(f.starts_with("=IF(B3=0,B2/(B4*12),"));
        assert!(f.contains("ROUND(B4*12,0)"));
        assert!(f.contains("(B3/100/12)"));
    }
}
