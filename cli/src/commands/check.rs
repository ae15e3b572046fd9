//! Check command - probe a target once and report its state.

use std::process::ExitCode;

use anyhow::Result;
use portwatch_core::{check, PortState, ProbeTarget};
use serde::Serialize;

#[derive(Serialize)]
struct CheckReport<'a> {
    host: &'a str,
    port: u16,
    state: PortState,
    in_use: bool,
}

/// Exit code 0 means the port is in use, 1 means it is free.
pub async fn run(target: &str, json: bool) -> Result<ExitCode> {
    let target: ProbeTarget = target.parse()?;
    let state = check(&target).await?;

    if json {
        let report = CheckReport {
            host: &target.host,
            port: target.port,
            state,
            in_use: state.is_in_use(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} is {}", target, state);
    }

    Ok(match state {
        PortState::InUse => ExitCode::SUCCESS,
        PortState::Free => ExitCode::FAILURE,
    })
}
