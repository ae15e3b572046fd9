//! Portwatch Core - probe a TCP port's state and wait for it to change.
//!
//! Two primitives, both loopback by default:
//!
//! - [`check`] probes a target once: a listener accepting the connection
//!   means the port is in use, a refusal means it is free.
//! - [`wait_for_status`] polls the probe on a fixed interval until the
//!   desired state is observed or a deadline elapses.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use portwatch_core::{wait_until_used, WaitOptions};
//!
//! # async fn example() -> portwatch_core::Result<()> {
//! // Block until the dev server comes up, probing every 250 ms.
//! let options = WaitOptions::until_used(3000).with_timeout(Duration::from_secs(10));
//! wait_until_used(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod probe;
pub mod wait;

// Re-export main types
pub use error::{Error, Result};
pub use models::{
    PortState, ProbeTarget, WaitOptions, DEFAULT_HOST, DEFAULT_RETRY_INTERVAL, DEFAULT_TIMEOUT,
};
pub use probe::{check, check_port, Probe, TcpProbe};
pub use wait::{wait_for_status, wait_until_free, wait_until_used, StatusWaiter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_port_sees_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let state = check_port(port).await.unwrap();
        assert_eq!(state, PortState::InUse);
    }
}
