use thiserror::Error;

use crate::solver::SolverError;

/// Errors raised while reading or validating a model configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Invalid model configuration: {0}")]
    ValidationError(String),
}

/// Crate level error.
#[derive(Error, Debug)]
pub enum SizingError {
    #[error("solver failed: {0}")]
    Solver(#[from] SolverError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("normalisation solve for {mission} failed: {reason}")]
    NormalizationFailed { mission: String, reason: String },

    #[error("invalid sweep: {0}")]
    InvalidSweep(String),

    #[error("gross mass iteration did not converge after {iterations} iterations (last change {residual:.3e} kg)")]
    MassIterationDiverged { iterations: usize, residual: f64 },

    #[error("invalid driver state: {0}")]
    InvalidState(String),
}

impl SizingError {
    /// Whether this wraps a solver failure that a sweep may record and skip.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SizingError::Solver(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

pub type SizingResult<T> = Result<T, SizingError>;
