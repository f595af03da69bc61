//! CLI command implementations.

pub mod config;
pub mod sim;
pub mod version;
