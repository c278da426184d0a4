//! cri: inspect Coveron coverage run info files
//!
//! ## Usage
//!
//! ```bash
//! cri inspect main.cri                  # Header, counts and records
//! cri inspect main.cri --format json    # Same, as JSON
//! cri verify main.cri --hash <64 hex> --random <32 hex>
//! ```

use clap::Parser;
use coveron_cli::handlers::{execute_inspect, execute_verify};
use coveron_cli::{init_logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(config.verbosity);
    if config.color == ColorChoice::Always {
        // console strips styling on non-terminals unless told otherwise
        console::set_colors_enabled(true);
    }

    match cli.command {
        Commands::Inspect(args) => execute_inspect(&config, &args),
        Commands::Verify(args) => execute_verify(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}
