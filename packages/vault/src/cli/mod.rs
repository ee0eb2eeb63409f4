//! Command-line interface

pub mod commands;
pub mod run_command;

pub use commands::{Cli, Commands};
pub use run_command::{CliError, CommandOutput, execute, read_event, run};
