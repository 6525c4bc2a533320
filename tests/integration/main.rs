#[path = "../common/mod.rs"]
mod common;

mod sizing_tests;
