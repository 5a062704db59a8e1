pub mod catalog;
pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod git;
pub mod hitlog;
pub mod investigate;
pub mod ledger;
pub mod module_set;
pub mod output;
pub mod shell;
pub mod snapshot;
pub mod state;

pub use error::{EhMetricsError, Result};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_REGRESSION: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
