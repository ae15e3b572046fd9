//! Waiting for a port to reach a desired state
//!
//! [`StatusWaiter`] polls a probe on a fixed interval and races the whole
//! loop against a single deadline. The deadline is the only bound; there
//! is no attempt limit. Dropping the returned future cancels the in-flight
//! probe and both timers, so nothing outlives the call.

use std::time::Duration;

use tokio::time;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{PortState, WaitOptions};
use crate::probe::{Probe, TcpProbe};

/// Polls a probe until the observed state matches the desired one.
///
/// The waiter holds no state between calls. It is generic over the probe
/// so tests can drive the loop with scripted results.
pub struct StatusWaiter<P: Probe = TcpProbe> {
    probe: P,
}

impl StatusWaiter<TcpProbe> {
    /// Waiter backed by real TCP connection attempts.
    pub fn new() -> Self {
        Self {
            probe: TcpProbe::new(),
        }
    }
}

impl Default for StatusWaiter<TcpProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Probe> StatusWaiter<P> {
    /// Waiter backed by a custom probe implementation.
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Wait until the target reports `options.desired`.
    ///
    /// The first probe runs immediately; after a mismatch the next attempt
    /// runs `options.retry_interval()` later. The session ends on the first
    /// of three outcomes:
    ///
    /// * the observed state matches: `Ok(())`
    /// * an attempt fails outright: that error, unretried (a mismatched
    ///   state is retried, an error is not)
    /// * `options.timeout()` elapses: [`Error::Timeout`], even if the
    ///   deadline fires mid-attempt
    pub async fn wait_for_status(&self, options: &WaitOptions) -> Result<()> {
        options.validate()?;

        let retry_interval = options.retry_interval();
        let deadline = options.timeout();
        debug!(
            addr = %options.target,
            desired = %options.desired,
            retry_interval_ms = retry_interval.as_millis() as u64,
            timeout_ms = deadline.as_millis() as u64,
            "Waiting for port status"
        );

        match time::timeout(deadline, self.poll_until(options, retry_interval)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(addr = %options.target, "Deadline elapsed before desired status");
                Err(Error::Timeout)
            }
        }
    }

    /// Wait until something is listening on the target. Injects the desired
    /// state into the options and delegates to [`Self::wait_for_status`].
    pub async fn wait_until_used(&self, options: WaitOptions) -> Result<()> {
        self.wait_for_status(&options.with_desired(PortState::InUse))
            .await
    }

    /// Wait until nothing is listening on the target. Injects the desired
    /// state into the options and delegates to [`Self::wait_for_status`].
    pub async fn wait_until_free(&self, options: WaitOptions) -> Result<()> {
        self.wait_for_status(&options.with_desired(PortState::Free))
            .await
    }

    /// The unbounded probe loop. The deadline in `wait_for_status` is what
    /// ends it when the state never matches.
    async fn poll_until(&self, options: &WaitOptions, retry_interval: Duration) -> Result<()> {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            let observed = self.probe.check(&options.target).await?;
            if observed == options.desired {
                debug!(
                    addr = %options.target,
                    attempt = attempt,
                    state = %observed,
                    "Desired status reached"
                );
                return Ok(());
            }
            debug!(
                addr = %options.target,
                attempt = attempt,
                state = %observed,
                "Status mismatch, retrying"
            );
            time::sleep(retry_interval).await;
        }
    }
}

/// Convenience function to wait until `options.desired` is observed,
/// probing with real TCP connection attempts.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use portwatch_core::{wait_for_status, WaitOptions};
///
/// # async fn example() -> portwatch_core::Result<()> {
/// let options = WaitOptions::until_used(3000).with_timeout(Duration::from_secs(10));
/// wait_for_status(&options).await?;
/// println!("dev server is up");
/// # Ok(())
/// # }
/// ```
pub async fn wait_for_status(options: &WaitOptions) -> Result<()> {
    StatusWaiter::new().wait_for_status(options).await
}

/// Convenience function to wait until something is listening on the target.
pub async fn wait_until_used(options: WaitOptions) -> Result<()> {
    StatusWaiter::new().wait_until_used(options).await
}

/// Convenience function to wait until nothing is listening on the target.
pub async fn wait_until_free(options: WaitOptions) -> Result<()> {
    StatusWaiter::new().wait_until_free(options).await
}
