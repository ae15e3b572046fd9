//! Portwatch CLI - probe TCP ports and wait for them to open or close
//!
//! A command-line tool for checking whether a TCP port is in use and for
//! blocking until a port reaches a desired state.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portwatch")]
#[command(author, version, about = "Probe TCP ports and wait for them to open or close")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe a target once and report its state
    #[command(alias = "probe")]
    Check {
        /// Target to probe: PORT, HOST:PORT, or [V6ADDR]:PORT
        target: String,
    },

    /// Poll a target until it reaches the desired state
    Wait {
        /// Target to probe: PORT, HOST:PORT, or [V6ADDR]:PORT
        target: String,

        /// State to wait for: 'used' or 'free'
        #[arg(short, long)]
        state: String,

        /// Delay between probe attempts in milliseconds [default: 250]
        #[arg(long, value_name = "MS")]
        retry_interval: Option<u64>,

        /// Give up after this many milliseconds [default: 2000]
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr so --json output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { target } => commands::check::run(&target, cli.json).await,
        Commands::Wait {
            target,
            state,
            retry_interval,
            timeout,
        } => commands::wait::run(&target, &state, retry_interval, timeout, cli.json).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
