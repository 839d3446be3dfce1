//! Fixed-rate amortization engine: payment, schedule, and roll-ups.

pub mod payment;
pub mod schedule;
pub mod summary;

pub use payment::{monthly_payment, monthly_rate, payment_formula, total_periods};
pub use schedule::{generate_schedule, AmortizationSchedule, PaymentRecord};
pub use summary::{amortize, AmortizationInput, AmortizationOutput};
