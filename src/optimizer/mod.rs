//! Orchestration of single, multi-mission and sweep solves.

pub mod driver;
pub mod report;
pub mod sweep;

pub use driver::*;
pub use report::*;
pub use sweep::*;
