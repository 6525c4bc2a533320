//! Nonlinear programming boundary: a symbolic expression graph, the
//! optimisation context that collects variables and constraints, and an
//! augmented Lagrangian driver around argmin's L-BFGS.

mod config;
mod error;
mod expr;
mod nlp;
mod problem;

pub use config::{OnFailure, SolverConfig};
pub use error::SolverError;
pub use expr::{Expr, Relation, RelationKind, Tape};
pub use problem::{NamedConstraint, Objective, Problem, Sense, Solution, Variable};
