//! Airfoil section models behind a narrow surrogate interface.

pub mod airfoil;
pub mod surrogate;

pub use airfoil::*;
pub use surrogate::*;
