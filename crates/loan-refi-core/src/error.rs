use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanRefiError {
    #[error("Invalid argument: {field} — {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanRefiError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanRefiError::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanRefiError {
    fn from(e: serde_json::Error) -> Self {
        LoanRefiError::SerializationError(e.to_string())
    }
}
