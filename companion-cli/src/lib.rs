//! # companion-cli
//!
//! Argument parsing and history loading for the `companion` binary.

pub mod cli;

#[cfg(test)]
mod cli_test;

pub use cli::{load_history, Cli, Commands};
