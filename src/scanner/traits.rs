//! Probe types and the `Prober` abstraction.
//!
//! Defines the request/result pair exchanged between the orchestrator and
//! the protocol-specific probes, and the trait those probes implement.

use crate::error::ProbeError;
use crate::types::{Host, Port};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Transport protocol of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP connect check.
    Tcp,
    /// UDP datagram check.
    Udp,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::Tcp
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// Reachability of a probed port.
///
/// Three-valued because a silent UDP port cannot be told apart from a
/// filtered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    /// Connection accepted or datagram answered.
    Open,
    /// Refused, unreachable, or the probe failed.
    Closed,
    /// No conclusive signal.
    Indeterminate,
}

impl Reachability {
    /// Tri-state as an optional boolean: `None` for `Indeterminate`.
    pub fn as_open_flag(self) -> Option<bool> {
        match self {
            Self::Open => Some(true),
            Self::Closed => Some(false),
            Self::Indeterminate => None,
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

/// Input to a single port check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub host: Host,
    pub port: Port,
    pub protocol: Protocol,
    pub timeout: Duration,
}

impl ProbeRequest {
    pub fn new(host: Host, port: Port, protocol: Protocol, timeout: Duration) -> Self {
        Self {
            host,
            port,
            protocol,
            timeout,
        }
    }
}

/// Note attached to UDP probes that heard nothing back.
pub const UDP_SILENCE_NOTE: &str = "No response (UDP is unreliable for port checking)";

/// Outcome of one probe.
///
/// Built only through the constructors below so that `error` is present
/// exactly when `reachability` is not `Open`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub host: Host,
    pub port: Port,
    pub protocol: Protocol,
    pub reachability: Reachability,
    /// Cause of a non-open outcome.
    pub error: Option<String>,
    /// Milliseconds, rounded to two decimals.
    pub latency_ms: Option<f64>,
}

impl ProbeResult {
    fn from_request(
        request: &ProbeRequest,
        reachability: Reachability,
        error: Option<String>,
        latency: Option<Duration>,
    ) -> Self {
        Self {
            host: request.host.clone(),
            port: request.port,
            protocol: request.protocol,
            reachability,
            error,
            latency_ms: latency.map(round_millis),
        }
    }

    /// The port accepted a connection or answered a datagram.
    pub fn open(request: &ProbeRequest, latency: Duration) -> Self {
        Self::from_request(request, Reachability::Open, None, Some(latency))
    }

    /// The probe failed; `latency` is set when the network call returned.
    pub fn closed(request: &ProbeRequest, cause: &ProbeError, latency: Option<Duration>) -> Self {
        Self::from_request(
            request,
            Reachability::Closed,
            Some(cause.to_string()),
            latency,
        )
    }

    /// No conclusive answer within the timeout.
    pub fn indeterminate(
        request: &ProbeRequest,
        note: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self::from_request(
            request,
            Reachability::Indeterminate,
            Some(note.into()),
            Some(latency),
        )
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.reachability == Reachability::Open
    }
}

fn round_millis(latency: Duration) -> f64 {
    (latency.as_micros() as f64 / 10.0).round() / 100.0
}

/// A single-port reachability check.
///
/// Implementations make exactly one attempt per call and convert every
/// failure into a `ProbeResult`; they must not retry.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Protocol this prober speaks.
    fn protocol(&self) -> Protocol;

    /// Probe a single port.
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProbeRequest {
        ProbeRequest::new(
            Host::parse("127.0.0.1").unwrap(),
            Port::new(80).unwrap(),
            Protocol::Tcp,
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_open_flag() {
        assert_eq!(Reachability::Open.as_open_flag(), Some(true));
        assert_eq!(Reachability::Closed.as_open_flag(), Some(false));
        assert_eq!(Reachability::Indeterminate.as_open_flag(), None);
    }

    #[test]
    fn test_error_set_iff_not_open() {
        let req = request();
        let open = ProbeResult::open(&req, Duration::from_millis(3));
        assert!(open.is_open());
        assert!(open.error.is_none());

        let closed = ProbeResult::closed(&req, &ProbeError::Refused, None);
        assert_eq!(closed.reachability, Reachability::Closed);
        assert_eq!(closed.error.as_deref(), Some("Connection refused"));
        assert!(closed.latency_ms.is_none());

        let unknown = ProbeResult::indeterminate(&req, UDP_SILENCE_NOTE, Duration::from_secs(1));
        assert_eq!(unknown.reachability, Reachability::Indeterminate);
        assert!(unknown.error.is_some());
    }

    #[test]
    fn test_latency_rounding() {
        assert_eq!(round_millis(Duration::from_micros(12_345)), 12.35);
        assert_eq!(round_millis(Duration::from_millis(5)), 5.0);
        assert_eq!(round_millis(Duration::ZERO), 0.0);
    }
}
