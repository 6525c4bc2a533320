mod assertions;
mod fixtures;
mod helpers;

// Re-export
pub use assertions::{
    assert_at_most_one_turn, assert_budgets_hold, assert_rules_hold, BUDGET_TOLERANCE,
};

pub use helpers::*;

pub use fixtures::*;
