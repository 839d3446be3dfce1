pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "refinance")]
pub mod refinance;

pub use error::LoanRefiError;
pub use types::*;

/// Standard result type for all loan-refi operations
pub type LoanRefiResult<T> = Result<T, LoanRefiError>;
