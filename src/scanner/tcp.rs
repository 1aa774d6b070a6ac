//! TCP connect probe.
//!
//! A port is open when the operating system completes the three-way
//! handshake within the timeout. The stream is dropped as soon as the
//! outcome is known.

use crate::error::{ProbeError, ProbeOutcome};
use crate::scanner::resolve::resolve;
use crate::scanner::traits::{ProbeRequest, ProbeResult, Prober, Protocol};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect prober. Needs no privileges.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(addr: SocketAddr, limit: Duration) -> ProbeOutcome<TcpStream> {
        match timeout(limit, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ProbeError::from_io(e)),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        let addr = match resolve(&request.host, request.port.as_u16(), request.timeout).await {
            Ok(addr) => addr,
            Err(e) => return ProbeResult::closed(request, &e, None),
        };

        let start = Instant::now();
        let outcome = Self::attempt_connect(addr, request.timeout).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(stream) => {
                drop(stream);
                tracing::debug!(%addr, "tcp connect succeeded");
                ProbeResult::open(request, elapsed)
            }
            // The attempt never completed, so there is no latency to report.
            Err(e @ ProbeError::Timeout) => ProbeResult::closed(request, &e, None),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "tcp connect failed");
                ProbeResult::closed(request, &e, Some(elapsed))
            }
        }
    }
}
