//! Host specification.
//!
//! A `Host` is either an IP literal or a syntactically valid hostname. It is
//! only validated here; name resolution happens inside each probe so that a
//! resolution failure is reported per port instead of aborting the command.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Error type for host validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("host must not be empty")]
    Empty,
    #[error("invalid host '{0}': not an IP address or valid hostname")]
    InvalidFormat(String),
}

/// A validated scan host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Host(String);

impl Host {
    /// Validate and wrap a host string.
    pub fn parse(s: &str) -> Result<Self, HostError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HostError::Empty);
        }

        // Accept bracketed IPv6 as typed in URLs.
        let unbracketed = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        if unbracketed.parse::<IpAddr>().is_ok() {
            return Ok(Self(unbracketed.to_string()));
        }
        if is_valid_hostname(s) {
            return Ok(Self(s.to_string()));
        }
        Err(HostError::InvalidFormat(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The literal IP address, if the host is not a name.
    pub fn ip(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

impl FromStr for Host {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    // A single trailing dot marks a fully qualified name.
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip_literals() {
        assert_eq!(Host::parse("192.168.1.1").unwrap().ip(), "192.168.1.1".parse().ok());
        assert!(Host::parse("::1").unwrap().ip().is_some());
        assert_eq!(Host::parse("[::1]").unwrap().as_str(), "::1");
    }

    #[test]
    fn test_parse_hostnames() {
        assert_eq!(Host::parse("example.com").unwrap().as_str(), "example.com");
        assert!(Host::parse("localhost").unwrap().ip().is_none());
        assert!(Host::parse("my-server.local.").is_ok());
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!(Host::parse("  "), Err(HostError::Empty));
        assert!(Host::parse("-invalid.com").is_err());
        assert!(Host::parse("bad host").is_err());
        assert!(Host::parse("a..b").is_err());
    }
}
