use chrono::NaiveDate;
use loan_refi_core::amortization::{
    amortize, generate_schedule, monthly_payment, total_periods, AmortizationInput,
};
use loan_refi_core::{LoanRefiError, LoanTerms};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const MONEY_TOL: Decimal = dec!(0.01);

fn sample_loans() -> Vec<LoanTerms> {
    vec![
        LoanTerms::new(dec!(555_000), dec!(5.49), dec!(27)),
        LoanTerms::new(dec!(220_000), dec!(6.49), dec!(27.5)),
        LoanTerms::new(dec!(120_000), dec!(0), dec!(10)),
        LoanTerms::new(dec!(50_000), dec!(12), dec!(5)),
        LoanTerms::new(dec!(1_000_000), dec!(3.25), dec!(15)),
        LoanTerms::new(dec!(10_000), dec!(7.5), dec!(0.5)),
    ]
}

// ===========================================================================
// Payment
// ===========================================================================

#[test]
fn test_zero_rate_payment_exact() {
    let terms = LoanTerms::new(dec!(120_000), dec!(0), dec!(10));
    assert_eq!(monthly_payment(&terms).unwrap(), dec!(1000));
}

#[test]
fn test_owner_occupied_payment() {
    // 555,000 at 5.49% over 27 years (324 periods)
    let terms = LoanTerms::new(dec!(555_000), dec!(5.49), dec!(27));
    let pmt = monthly_payment(&terms).unwrap();
    assert!(
        (pmt - dec!(3288.53)).abs() < dec!(1),
        "Expected payment ~3288.53, got {pmt}"
    );
}

#[test]
fn test_invalid_argument_variant() {
    let err = monthly_payment(&LoanTerms::new(dec!(0), dec!(5), dec!(30))).unwrap_err();
    assert!(matches!(err, LoanRefiError::InvalidArgument { .. }));
    assert!(err.to_string().contains("principal"));
}

#[test]
fn test_fractional_term_periods() {
    assert_eq!(total_periods(dec!(27.5)).unwrap(), 330);
    let terms = LoanTerms::new(dec!(220_000), dec!(6.49), dec!(27.5));
    assert_eq!(generate_schedule(&terms, None).unwrap().len(), 330);
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_principal_portions_sum_to_principal() {
    for terms in sample_loans() {
        let schedule = generate_schedule(&terms, None).unwrap();
        let total: Decimal = schedule.iter().map(|r| r.principal_portion).sum();
        assert!(
            (total - terms.principal).abs() < MONEY_TOL,
            "{terms:?}: principal portions sum to {total}"
        );
    }
}

#[test]
fn test_final_ending_balance_zero() {
    for terms in sample_loans() {
        let schedule = generate_schedule(&terms, None).unwrap();
        assert_eq!(schedule.last().unwrap().ending_balance, Decimal::ZERO);
    }
}

#[test]
fn test_no_negative_balances_and_bounded_length() {
    for terms in sample_loans() {
        let n = total_periods(terms.term_years).unwrap() as usize;
        let schedule = generate_schedule(&terms, None).unwrap();
        assert!(schedule.len() <= n);
        assert!(schedule.iter().all(|r| r.ending_balance >= Decimal::ZERO));
    }
}

#[test]
fn test_cumulative_interest_running_sum() {
    for terms in sample_loans() {
        let schedule = generate_schedule(&terms, None).unwrap();
        let mut running = Decimal::ZERO;
        let mut previous = Decimal::ZERO;
        for rec in &schedule {
            running += rec.interest_portion;
            assert_eq!(rec.cumulative_interest, running);
            assert!(rec.cumulative_interest >= previous);
            previous = rec.cumulative_interest;
        }
    }
}

#[test]
fn test_ending_balance_is_clamped_difference() {
    for terms in sample_loans() {
        let schedule = generate_schedule(&terms, None).unwrap();
        for rec in &schedule {
            let expected = (rec.beginning_balance - rec.principal_portion).max(Decimal::ZERO);
            assert_eq!(rec.ending_balance, expected);
        }
    }
}

#[test]
fn test_zero_rate_records() {
    let terms = LoanTerms::new(dec!(120_000), dec!(0), dec!(10));
    let schedule = generate_schedule(&terms, None).unwrap();
    assert_eq!(schedule.len(), 120);
    for rec in &schedule {
        assert_eq!(rec.interest_portion, Decimal::ZERO);
        assert_eq!(rec.principal_portion, dec!(1000));
        assert_eq!(rec.payment_amount, dec!(1000));
    }
}

#[test]
fn test_schedule_is_deterministic() {
    let terms = LoanTerms::new(dec!(220_000), dec!(6.49), dec!(27.5));
    let start = NaiveDate::from_ymd_opt(2025, 3, 1);
    let a = generate_schedule(&terms, start).unwrap();
    let b = generate_schedule(&terms, start).unwrap();
    assert_eq!(a, b);
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_amortize_json_input() {
    let json = r#"{"principal": "555000", "annual_rate": "5.49", "term_years": "27",
                   "start_date": "2025-01-01"}"#;
    let input: AmortizationInput = serde_json::from_str(json).unwrap();
    let out = amortize(&input).unwrap();
    assert_eq!(out.result.schedule.len(), 324);
    assert_eq!(out.result.annual_summaries.len(), 27);
    assert_eq!(
        out.result.summary.payoff_date,
        NaiveDate::from_ymd_opt(2051, 12, 1)
    );
}

#[test]
fn test_record_field_order_in_json() {
    let terms = LoanTerms::new(dec!(12_000), dec!(0), dec!(1));
    let schedule = generate_schedule(&terms, None).unwrap();
    let json = serde_json::to_string(&schedule[0]).unwrap();
    let order = [
        "payment_number",
        "beginning_balance",
        "payment_amount",
        "principal_portion",
        "interest_portion",
        "ending_balance",
        "cumulative_interest",
    ];
    let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}
