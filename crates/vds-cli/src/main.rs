//! # vds CLI entry point
//!
//! Parses arguments, installs logging, and dispatches to subcommand
//! handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vds_cli::inspect::{run_inspect, InspectArgs};
use vds_cli::verify::{run_verify, VerifyArgs};

/// Decode and verify Visible Digital Seals.
#[derive(Parser, Debug)]
#[command(name = "vds", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a seal's header and payload; optionally verify and export views.
    Inspect(InspectArgs),

    /// Verify a seal and print the verification report as JSON.
    Verify(VerifyArgs),
}

fn init_tracing(verbose: u8, json: bool) {
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
        .with_writer(std::io::stderr)
        .with_target(false);
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
        Commands::Inspect(args) => run_inspect(args),
        Commands::Verify(args) => run_verify(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_verify() {
        let cli = Cli::try_parse_from(["vds", "verify", "seal.dat", "--config", "trust.yaml"]).unwrap();
        let Commands::Verify(args) = cli.command else {
            panic!("expected verify");
        };
        assert_eq!(args.file.to_str(), Some("seal.dat"));
        assert_eq!(args.config.as_deref().and_then(|p| p.to_str()), Some("trust.yaml"));
        assert!(!args.compact);
    }

    #[test]
    fn cli_parse_inspect_with_outputs() {
        let cli = Cli::try_parse_from([
            "vds", "-vv", "inspect", "seal.txt", "--html-out", "out.html", "--json-out", "out.json",
            "--language", "fr", "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        let Commands::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.language.as_deref(), Some("fr"));
        assert!(args.html_out.is_some() && args.json_out.is_some());
        assert!(args.config.is_none());
    }

    #[test]
    fn cli_requires_file() {
        assert!(Cli::try_parse_from(["vds", "verify"]).is_err());
    }
}
