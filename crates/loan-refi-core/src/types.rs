use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanRefiError;
use crate::LoanRefiResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Nominal annual rates quoted as percentages (5.49 = 5.49%).
pub type Percent = Decimal;

/// Periodic rates expressed as decimals (0.004575 = 0.4575% per month).
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Fixed-rate, fully amortizing loan terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed (or outstanding balance being refinanced).
    pub principal: Money,
    /// Nominal annual rate in percent.
    pub annual_rate: Percent,
    /// Term in years; fractional terms such as 27.5 are allowed.
    pub term_years: Years,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate: Percent, term_years: Years) -> Self {
        LoanTerms {
            principal,
            annual_rate,
            term_years,
        }
    }

    /// Reject non-positive principal, negative rate, or non-positive term.
    pub fn validate(&self) -> LoanRefiResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanRefiError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(LoanRefiError::invalid(
                "annual_rate",
                "Annual rate cannot be negative",
            ));
        }
        if self.term_years <= Decimal::ZERO {
            return Err(LoanRefiError::invalid(
                "term_years",
                "Term must be positive",
            ));
        }
        Ok(())
    }

    /// Same principal with a different rate and/or term.
    pub fn with_overrides(&self, annual_rate: Option<Percent>, term_years: Option<Years>) -> Self {
        LoanTerms {
            principal: self.principal,
            annual_rate: annual_rate.unwrap_or(self.annual_rate),
            term_years: term_years.unwrap_or(self.term_years),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
