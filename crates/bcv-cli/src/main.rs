//! # bcv CLI entry point
//!
//! Parses arguments, initializes tracing, loads the optional config file and
//! dispatches to the subcommand handlers in `bcv_cli`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bcv_cli::config::CliConfig;
use bcv_cli::issuer::{run_issuer, IssuerArgs};
use bcv_cli::parse::{run_parse, ParseArgs};
use bcv_cli::verify::{run_verify, VerifyArgs};

/// Blockcerts credential parser and verifier.
#[derive(Parser, Debug)]
#[command(name = "bcv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a credential and print its display fields.
    Parse(ParseArgs),

    /// Parse an issuer profile and print its key schedule.
    Issuer(IssuerArgs),

    /// Verify a credential against the blockchain.
    Verify(VerifyArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match &cli.command {
        Commands::Parse(args) => run_parse(args),
        Commands::Issuer(args) => run_issuer(args),
        Commands::Verify(args) => {
            CliConfig::load(cli.config.as_deref()).and_then(|config| run_verify(args, &config))
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
