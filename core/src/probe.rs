//! One-shot TCP port probing
//!
//! A probe opens exactly one outbound connection to the target and reports
//! what happened. Connection refused is the normal "nothing listening"
//! outcome, not an error. Retrying and time-bounding live in [`crate::wait`],
//! never here.

use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{PortState, ProbeTarget};

/// Trait for probe implementations.
///
/// The production implementation is [`TcpProbe`]. The waiter is generic
/// over this trait so tests can drive it with scripted probes instead of
/// real sockets.
pub trait Probe: Send + Sync {
    /// Determine the current state of `target` with a single connection
    /// attempt.
    fn check(
        &self,
        target: &ProbeTarget,
    ) -> impl std::future::Future<Output = Result<PortState>> + Send;
}

/// Probe backed by a real TCP connection attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProbe;

impl TcpProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Probe for TcpProbe {
    /// Open one connection to the target and classify the outcome:
    ///
    /// * accepted: `Ok(PortState::InUse)`, the stream is closed before
    ///   returning
    /// * refused: `Ok(PortState::Free)`
    /// * anything else (unreachable host, resolution failure, permission
    ///   denied): `Err(Error::Connection)`
    ///
    /// There is no internal timeout. The session deadline in [`crate::wait`]
    /// bounds a hung attempt by dropping this future.
    async fn check(&self, target: &ProbeTarget) -> Result<PortState> {
        target.validate()?;

        let addr = target.addr();
        debug!(addr = %addr, "Probing port");

        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                drop(stream);
                debug!(addr = %addr, "Connection accepted, port is in use");
                Ok(PortState::InUse)
            }
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                debug!(addr = %addr, "Connection refused, port is free");
                Ok(PortState::Free)
            }
            Err(e) => {
                warn!(addr = %addr, error = %e, "Connection attempt failed");
                Err(Error::Connection(e))
            }
        }
    }
}

/// Convenience function to probe a target once with a real TCP connection.
///
/// # Example
///
/// ```no_run
/// use portwatch_core::{check, ProbeTarget};
///
/// # async fn example() -> portwatch_core::Result<()> {
/// let state = check(&ProbeTarget::new(5432)).await?;
/// if state.is_in_use() {
///     println!("database is up");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn check(target: &ProbeTarget) -> Result<PortState> {
    TcpProbe::new().check(target).await
}

/// Convenience function to probe a port on the loopback address.
pub async fn check_port(port: u16) -> Result<PortState> {
    check(&ProbeTarget::new(port)).await
}
