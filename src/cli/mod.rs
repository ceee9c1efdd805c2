//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `migrate` - Database migrations per schema
//! - `ping` - Connectivity check

pub mod args;

pub use args::{Cli, Commands};
