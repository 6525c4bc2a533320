pub mod course;
pub mod lap;
pub mod scoring;
pub mod study;

pub use course::*;
pub use lap::*;
pub use scoring::*;
pub use study::*;
