//! Coveron CRI command-line tool
//!
//! Decodes and checks the coverage run info files written by
//! `coveron-runtime`.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{Cli, ColorArg, Commands, InspectArgs, OutputFormat, VerifyArgs};
pub use config::{init_logging, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
