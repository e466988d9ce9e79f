//! Fake ActivityWatch data CLI library.
//!
//! This crate provides the CLI interface for the fake data generator.

mod cli;
pub mod commands;
mod config;

pub use cli::Cli;
pub use config::Config;
