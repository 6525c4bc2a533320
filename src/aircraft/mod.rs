pub mod aerodynamics;
pub mod config;
pub mod geometry;
pub mod mass;
pub mod model;

pub use config::*;
pub use geometry::*;
pub use mass::*;
pub use model::*;
