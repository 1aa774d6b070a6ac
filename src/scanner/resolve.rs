//! Host name resolution for probes.

use crate::error::{ProbeError, ProbeOutcome};
use crate::types::Host;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::lookup_host;
use tokio::time::timeout;

/// Resolve `host` to the single address a probe will use.
///
/// IP literals skip the resolver. Names go through the system resolver,
/// bounded by `limit`; IPv4 results are preferred.
pub async fn resolve(host: &Host, port: u16, limit: Duration) -> ProbeOutcome<SocketAddr> {
    if let Some(ip) = host.ip() {
        return Ok(SocketAddr::new(ip, port));
    }

    let addrs: Vec<SocketAddr> = match timeout(limit, lookup_host((host.as_str(), port))).await {
        Ok(Ok(addrs)) => addrs.collect(),
        Ok(Err(e)) => return Err(ProbeError::Resolution(e.to_string())),
        Err(_) => return Err(ProbeError::Resolution("lookup timed out".to_string())),
    };

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| ProbeError::Resolution(format!("no addresses found for '{}'", host)))
}
