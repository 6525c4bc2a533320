use thiserror::Error;

/// Failures surfaced by the nonlinear programming boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("constraint set infeasible from the given start: max violation {violation:.3e} after {iterations} iterations")]
    InfeasibleConstraintSet { violation: f64, iterations: usize },

    #[error("iteration limit of {iterations} reached with max violation {violation:.3e}")]
    IterationLimitExceeded { iterations: usize, violation: f64 },

    #[error("no objective attached to the problem")]
    MissingObjective,

    #[error("expression is not a declared decision variable")]
    UnknownVariable,

    #[error("optimizer backend error: {0}")]
    Backend(String),
}

impl SolverError {
    /// Whether the failure is an expected outcome of exploring the design
    /// space, as opposed to a misuse of the solver.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SolverError::InfeasibleConstraintSet { .. } | SolverError::IterationLimitExceeded { .. }
        )
    }
}
