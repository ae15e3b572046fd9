//! Wait command - poll a target until it reaches the desired state.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use portwatch_core::{wait_for_status, Error, PortState, WaitOptions};
use serde::Serialize;

#[derive(Serialize)]
struct WaitReport<'a> {
    host: &'a str,
    port: u16,
    desired: PortState,
    outcome: &'a str,
    elapsed_ms: u64,
}

/// Exit code 0 means the desired state was reached, 1 means the deadline
/// elapsed first. Any other failure bubbles up.
pub async fn run(
    target: &str,
    state: &str,
    retry_interval_ms: Option<u64>,
    timeout_ms: Option<u64>,
    json: bool,
) -> Result<ExitCode> {
    let desired: PortState = state.parse()?;
    let mut options = WaitOptions::new(target.parse()?, desired);
    if let Some(ms) = retry_interval_ms {
        options = options.with_retry_interval(Duration::from_millis(ms));
    }
    if let Some(ms) = timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }

    let started = Instant::now();
    let result = wait_for_status(&options).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            if json {
                print_report(&options, "reached", elapsed_ms)?;
            } else {
                println!("{} is {} (after {} ms)", options.target, desired, elapsed_ms);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Timeout) => {
            if json {
                print_report(&options, "timeout", elapsed_ms)?;
            } else {
                eprintln!(
                    "Timed out after {} ms waiting for {} to become {}",
                    elapsed_ms, options.target, desired
                );
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(options: &WaitOptions, outcome: &str, elapsed_ms: u64) -> Result<()> {
    let report = WaitReport {
        host: &options.target.host,
        port: options.target.port,
        desired: options.desired,
        outcome,
        elapsed_ms,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
