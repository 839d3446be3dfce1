pub mod decisions;
pub mod delta;
pub mod portfolio;

pub use decisions::{evaluate_decisions, DecisionInput, DecisionOutput};
pub use delta::{compare_refinance, scenario_delta, Breakeven, RefinanceInput, ScenarioDelta};
pub use portfolio::{analyze_portfolio, default_portfolio, PortfolioInput, PortfolioOutput};
