//! EDGELINE: sports-betting expected-value scanner.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod bankroll;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod odds;
pub mod provider;
pub mod results;
pub mod telegram;
pub mod types;
