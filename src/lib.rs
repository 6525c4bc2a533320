pub mod aero;
pub mod aircraft;
pub mod constants;
pub mod constraints;
pub mod error;
pub mod mission;
pub mod optimizer;
pub mod solver;
pub mod units;

pub use aircraft::{Aircraft, ModelConfig};
pub use constraints::{assemble, ConstraintOptions};
pub use error::{ConfigError, SizingError, SizingResult};
pub use mission::{MissionKind, Study};
pub use optimizer::{Driver, DriverConfig, FailurePolicy, SentinelScore};
pub use solver::{Expr, Problem, SolverConfig, SolverError};
