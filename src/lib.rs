// ABOUTME: Library root for revdeploy - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod error;
pub mod listener;
pub mod output;
pub mod pipeline;
pub mod revision;
pub mod types;
