//! Scan job configuration.

use crate::error::InputError;
use crate::scanner::traits::{ProbeRequest, Protocol};
use crate::types::{Host, Port, PortRange};
use std::time::Duration;

/// A full range scan: what to probe and how hard.
#[derive(Debug, Clone)]
pub struct ScanJob {
    /// Host every probe targets.
    pub host: Host,
    /// Protocol of every probe.
    pub protocol: Protocol,
    /// Inclusive port bounds.
    pub ports: PortRange,
    /// Per-probe timeout.
    pub timeout: Duration,
    /// Number of probes allowed in flight.
    pub workers: usize,
    /// Probes started per second, 0 for unlimited.
    pub rate_limit: u32,
}

impl ScanJob {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_WORKERS: usize = 10;

    /// Create a job with default timeout and worker count.
    pub fn new(host: Host, protocol: Protocol, ports: PortRange) -> Self {
        Self {
            host,
            protocol,
            ports,
            timeout: Self::DEFAULT_TIMEOUT,
            workers: Self::DEFAULT_WORKERS,
            rate_limit: 0,
        }
    }

    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the dispatch rate limit.
    pub fn with_rate_limit(mut self, rate: u32) -> Self {
        self.rate_limit = rate;
        self
    }

    /// Reject settings no scan can run with.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.workers == 0 {
            return Err(InputError::Workers);
        }
        if self.timeout.is_zero() {
            return Err(InputError::Timeout);
        }
        Ok(())
    }

    /// Build the probe request for one port of this job.
    pub fn request_for(&self, port: Port) -> ProbeRequest {
        ProbeRequest::new(self.host.clone(), port, self.protocol, self.timeout)
    }

    /// Number of ports this job covers.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}
