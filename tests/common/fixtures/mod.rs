mod models;

// Re-export test fixtures
pub use models::*;
