//! Core data models for portwatch
//!
//! Value objects describing what to probe and what to wait for. Each call
//! takes its own copy; nothing here is shared between sessions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Host probed when none is given.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Delay between probe attempts while waiting, unless overridden.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(250);

/// Deadline for a whole waiting session, unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

// ==== Port State ====

/// Observed (or desired) state of a TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    /// A listener accepted the connection attempt.
    InUse,
    /// The connection attempt was refused; nothing is listening.
    Free,
}

impl PortState {
    /// Whether something is listening.
    pub fn is_in_use(&self) -> bool {
        matches!(self, PortState::InUse)
    }

    /// Whether nothing is listening.
    pub fn is_free(&self) -> bool {
        matches!(self, PortState::Free)
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::InUse => write!(f, "in use"),
            PortState::Free => write!(f, "free"),
        }
    }
}

impl FromStr for PortState {
    type Err = Error;

    /// Accept the words used on the command line: `used` (also `in-use`,
    /// `in_use`, `open`) and `free` (also `closed`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "used" | "in-use" | "in_use" | "inuse" | "open" => Ok(PortState::InUse),
            "free" | "closed" => Ok(PortState::Free),
            other => Err(Error::InvalidArgument(format!(
                "desired state must be 'used' or 'free', got '{other}'"
            ))),
        }
    }
}

// ==== Probe Target ====

/// A single (host, port) pair to probe.
///
/// The port range is enforced by the type; text input goes through
/// [`ProbeTarget::from_str`], which rejects anything that is not a port
/// number in range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeTarget {
    /// Host name or address to connect to.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to probe.
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

impl ProbeTarget {
    /// Target a port on the loopback address.
    pub fn new(port: u16) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port,
        }
    }

    /// Replace the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// The `host:port` form handed to the connector. IPv6 hosts are
    /// bracketed so the port separator stays unambiguous.
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Reject values a connection attempt could not use. Runs before any
    /// socket is opened or timer armed.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidArgument("host must not be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr())
    }
}

impl FromStr for ProbeTarget {
    type Err = Error;

    /// Parse `PORT`, `HOST:PORT`, or `[V6ADDR]:PORT`.
    ///
    /// A missing host means loopback, so `":8080"` and `"8080"` are the
    /// same target. Port text that is not a number in `0..=65535` fails
    /// with [`Error::InvalidPort`] carrying the text verbatim.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidArgument("target must not be empty".to_string()));
        }

        if let Some(rest) = s.strip_prefix('[') {
            // Bracketed IPv6 form: [::1]:8080
            let Some((host, after)) = rest.split_once(']') else {
                return Err(Error::InvalidArgument(format!(
                    "unterminated '[' in target '{s}'"
                )));
            };
            let Some(port_text) = after.strip_prefix(':') else {
                return Err(Error::InvalidPort(s.to_string()));
            };
            if host.is_empty() {
                return Err(Error::InvalidArgument("host must not be empty".to_string()));
            }
            return Ok(Self {
                host: host.to_string(),
                port: parse_port(port_text)?,
            });
        }

        match s.rsplit_once(':') {
            Some((host, port_text)) => {
                let port = parse_port(port_text)?;
                let host = if host.is_empty() { DEFAULT_HOST } else { host };
                Ok(Self {
                    host: host.to_string(),
                    port,
                })
            }
            None => Ok(Self::new(parse_port(s)?)),
        }
    }
}

/// Parse port text, naming the rejected text in the error.
fn parse_port(text: &str) -> Result<u16> {
    text.parse::<u16>()
        .map_err(|_| Error::InvalidPort(text.to_string()))
}

// ==== Wait Options ====

/// Options for a waiting session: what to probe, which state ends the
/// session, and how patiently to poll.
///
/// The interval fields are in milliseconds; zero (the deserialization
/// default) means "use the built-in default". The desired state has no
/// default and is always supplied at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// The (host, port) pair to probe.
    #[serde(flatten)]
    pub target: ProbeTarget,
    /// The state that ends the session successfully.
    pub desired: PortState,
    /// Delay between probe attempts in milliseconds. Zero means the
    /// default of 250 ms.
    #[serde(default)]
    pub retry_interval_ms: u64,
    /// Deadline for the whole session in milliseconds. Zero means the
    /// default of 2000 ms.
    #[serde(default)]
    pub timeout_ms: u64,
}

impl WaitOptions {
    /// Options for `target` with the default retry interval and timeout.
    pub fn new(target: ProbeTarget, desired: PortState) -> Self {
        Self {
            target,
            desired,
            retry_interval_ms: 0,
            timeout_ms: 0,
        }
    }

    /// Options for a port on the loopback address.
    pub fn for_port(port: u16, desired: PortState) -> Self {
        Self::new(ProbeTarget::new(port), desired)
    }

    /// Options that wait for a listener to appear on `port` (loopback).
    pub fn until_used(port: u16) -> Self {
        Self::for_port(port, PortState::InUse)
    }

    /// Options that wait for `port` (loopback) to have no listener.
    pub fn until_free(port: u16) -> Self {
        Self::for_port(port, PortState::Free)
    }

    /// Replace the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.target.host = host.into();
        self
    }

    /// Replace the desired state.
    pub fn with_desired(mut self, desired: PortState) -> Self {
        self.desired = desired;
        self
    }

    /// Set the delay between probe attempts.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the session deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Delay between probe attempts, with the zero-means-default rule
    /// applied.
    pub fn retry_interval(&self) -> Duration {
        if self.retry_interval_ms == 0 {
            DEFAULT_RETRY_INTERVAL
        } else {
            Duration::from_millis(self.retry_interval_ms)
        }
    }

    /// Session deadline, with the zero-means-default rule applied.
    pub fn timeout(&self) -> Duration {
        if self.timeout_ms == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_millis(self.timeout_ms)
        }
    }

    /// Argument checks that run before any socket or timer exists.
    pub fn validate(&self) -> Result<()> {
        self.target.validate()
    }
}
