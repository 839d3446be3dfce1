use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Serialize;

use loan_refi_core::amortization::{self, AmortizationInput};
use loan_refi_core::refinance::{self, DecisionInput, PortfolioInput, RefinanceInput};
use loan_refi_core::LoanTerms;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Serialize)]
struct PaymentResult {
    monthly_payment: Decimal,
    total_periods: u32,
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = PaymentResult {
        monthly_payment: amortization::monthly_payment(&terms).map_err(to_napi_error)?,
        total_periods: amortization::total_periods(terms.term_years).map_err(to_napi_error)?,
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payment_formula(principal_cell: String, rate_cell: String, term_cell: String) -> String {
    amortization::payment_formula(&principal_cell, &rate_cell, &term_cell)
}

// ---------------------------------------------------------------------------
// Refinance
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_refinance(input_json: String) -> NapiResult<String> {
    let input: RefinanceInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = refinance::compare_refinance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn evaluate_decisions(input_json: String) -> NapiResult<String> {
    let input: DecisionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = refinance::evaluate_decisions(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// An empty string analyses the built-in portfolio.
#[napi]
pub fn analyze_portfolio(input_json: String) -> NapiResult<String> {
    let input: PortfolioInput = if input_json.trim().is_empty() {
        refinance::default_portfolio()
    } else {
        serde_json::from_str(&input_json).map_err(to_napi_error)?
    };
    let output = refinance::analyze_portfolio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
