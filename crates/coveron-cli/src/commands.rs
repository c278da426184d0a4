//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cri: inspect and verify Coveron coverage run info files
#[derive(Parser, Debug)]
#[command(name = "cri")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a CRI file and print its header and records
    Inspect(InspectArgs),

    /// Check that a CRI file belongs to a given instrumentation
    Verify(VerifyArgs),
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// CRI file to decode
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// CRI file to check
    pub file: PathBuf,

    /// Expected source hash (64 hex characters)
    #[arg(long)]
    pub hash: String,

    /// Expected instrumentation random (32 hex characters)
    #[arg(long)]
    pub random: String,
}

/// Output format for inspect
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inspect_defaults_to_text() {
        let cli = Cli::parse_from(["cri", "inspect", "run.cri"]);
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.file, PathBuf::from("run.cri"));
                assert_eq!(args.format, OutputFormat::Text);
            }
            Commands::Verify(_) => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_parse_inspect_json() {
        let cli = Cli::parse_from(["cri", "inspect", "run.cri", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::Inspect(InspectArgs {
                format: OutputFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_verify() {
        let cli = Cli::parse_from([
            "cri", "verify", "run.cri", "--hash", "ab", "--random", "cd",
        ]);
        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(args.hash, "ab");
                assert_eq!(args.random, "cd");
            }
            Commands::Inspect(_) => panic!("expected verify"),
        }
    }

    #[test]
    fn test_verify_requires_identity() {
        assert!(Cli::try_parse_from(["cri", "verify", "run.cri"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["cri", "-vv", "--color", "never", "inspect", "x.cri"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert!(matches!(cli.color, ColorArg::Never));

        let cli = Cli::parse_from(["cri", "inspect", "x.cri", "-q"]);
        assert!(cli.quiet);
    }
}
