use serde::{Deserialize, Serialize};

/// Configuration for the augmented Lagrangian solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Budget of inner L-BFGS iterations summed over all outer iterations
    pub max_iterations: usize,
    /// Maximum number of multiplier updates
    pub max_outer_iterations: usize,
    /// Iteration cap of a single inner solve
    pub inner_iterations: usize,
    /// Largest scaled constraint violation accepted as feasible
    pub feasibility_tolerance: f64,
    /// Largest scaled projected Lagrangian gradient, and complementarity gap,
    /// accepted at an optimum (relative to the objective magnitude)
    pub optimality_tolerance: f64,
    /// Gradient norm at which an inner solve stops
    pub gradient_tolerance: f64,
    /// Starting quadratic penalty weight
    pub initial_penalty: f64,
    /// Factor applied to the penalty when a subproblem ends too far from
    /// the feasible set
    pub penalty_growth: f64,
    /// Upper limit of the penalty weight
    pub max_penalty: f64,
    /// Number of correction pairs kept by L-BFGS
    pub lbfgs_memory: usize,
    /// Whether a solve starts from the previous solution when one exists
    pub warm_start: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            max_outer_iterations: 50,
            inner_iterations: 200,
            feasibility_tolerance: 1e-6,
            optimality_tolerance: 1e-4,
            gradient_tolerance: 1e-9,
            initial_penalty: 10.0,
            penalty_growth: 10.0,
            max_penalty: 1e9,
            lbfgs_memory: 7,
            warm_start: true,
        }
    }
}

/// What `solve` does when the problem cannot be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnFailure {
    /// Return the error to the caller.
    #[default]
    Error,
    /// Return the last iterate, flagged as not converged.
    ReturnLast,
}
