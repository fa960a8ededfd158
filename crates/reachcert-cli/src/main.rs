//! reachcert CLI - build, partition and re-validate reachability certificates

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::commands::{self, CheckArgs, Overrides};

#[derive(Parser)]
#[command(name = "reachcert")]
#[command(about = "Parallel re-validation of reachability certificates", long_about = None)]
#[command(version)]
struct Cli {
    /// Checker configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Disable colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explore a program and write a closed certificate
    Explore {
        /// Program file (JSON)
        #[arg(short, long)]
        program: PathBuf,

        /// Certificate output file (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Give up once the certificate would exceed this many states
        #[arg(long, default_value = "100000")]
        max_states: usize,
    },

    /// Partition a certificate and write the binary layout
    Partition {
        /// Program file (JSON)
        #[arg(short, long)]
        program: PathBuf,

        /// Certificate file (JSON)
        #[arg(short = 'C', long)]
        certificate: PathBuf,

        /// Layout output file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Check a certificate
    Check {
        /// Program file (JSON)
        #[arg(short, long)]
        program: PathBuf,

        /// Certificate file (JSON)
        #[arg(short = 'C', long)]
        certificate: PathBuf,

        /// Checking strategy
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Check a layout written by `partition`
    Verify {
        /// Program file (JSON)
        #[arg(short, long)]
        program: PathBuf,

        /// Layout file
        #[arg(short, long)]
        layout: PathBuf,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Checking strategy on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    /// One task per partition
    Partitioned,
    /// Barrier-synchronized workers over all states
    ReachedSet,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("reachcert=debug,reachcert_check=debug,reachcert_partition=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Explore {
            program,
            output,
            max_states,
        } => commands::explore(&program, &output, max_states),
        Commands::Partition {
            program,
            certificate,
            output,
            overrides,
        } => commands::partition(&program, &certificate, &output, config, &overrides),
        Commands::Check {
            program,
            certificate,
            strategy,
            json,
            overrides,
        } => commands::check(
            &CheckArgs {
                program,
                input: certificate,
                json,
            },
            strategy,
            config,
            &overrides,
        ),
        Commands::Verify {
            program,
            layout,
            json,
            overrides,
        } => commands::verify(
            &CheckArgs {
                program,
                input: layout,
                json,
            },
            config,
            &overrides,
        ),
    };

    match result {
        Ok(true) => Ok(()),
        // Rejected certificate: the outcome is already printed
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("{}", cli::format::format_error(&format!("{e:#}")));
            if cli.debug {
                eprintln!("\n{e:#?}");
            } else {
                eprintln!("\n{}", "Run with --debug for more details".dimmed());
            }
            std::process::exit(1);
        }
    }
}
