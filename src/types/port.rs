//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the inclusive range a scan covers, parsed from `"80"` or
//! `"80-443"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value.into()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }
        // Parse wide so "70000" reports as out of range rather than malformed.
        let value: u64 = s
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        u16::try_from(value)
            .ok()
            .and_then(Port::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u64),
    #[error("invalid port number: '{0}'")]
    InvalidFormat(String),
    #[error("invalid port range '{0}': expected start-end (e.g. 80-443)")]
    MalformedRange(String),
    #[error("invalid port range: start ({0}) must be less than or equal to end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// An inclusive range of ports. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start > end {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    pub const fn start(&self) -> Port {
        self.start
    }

    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// Always false; a valid range holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether this range covers exactly one port.
    pub const fn is_single(&self) -> bool {
        self.start.0 == self.end.0
    }

    /// Iterate over all ports in this range, ascending.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PortRange {
    type Err = PortError;

    /// Parse `"N"` or `"start-end"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        match s.split_once('-') {
            None => Ok(Self::single(s.parse()?)),
            Some((start, end)) => {
                if start.trim().is_empty() || end.trim().is_empty() || end.contains('-') {
                    return Err(PortError::MalformedRange(s.to_string()));
                }
                Self::new(start.parse()?, end.parse()?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
        assert_eq!("443".parse::<Port>().unwrap().as_u16(), 443);
    }

    #[test]
    fn test_range_parsing() {
        let single: PortRange = "80".parse().unwrap();
        assert!(single.is_single());
        assert_eq!(single.len(), 1);

        let range: PortRange = "1-100".parse().unwrap();
        assert_eq!(range.len(), 100);
        assert_eq!(range.to_string(), "1-100");

        let full: PortRange = "1-65535".parse().unwrap();
        assert_eq!(full.len(), 65535);
        assert_eq!(full.iter().last(), Port::new(65535));
    }

    #[test]
    fn test_range_iter_ascending() {
        let range: PortRange = "8000-8003".parse().unwrap();
        let ports: Vec<u16> = range.iter().map(Port::as_u16).collect();
        assert_eq!(ports, vec![8000, 8001, 8002, 8003]);
    }

    #[test]
    fn test_malformed_specs_rejected() {
        assert_eq!(
            "abc".parse::<PortRange>(),
            Err(PortError::InvalidFormat("abc".into()))
        );
        assert_eq!(
            "80-".parse::<PortRange>(),
            Err(PortError::MalformedRange("80-".into()))
        );
        assert_eq!(
            "500-10".parse::<PortRange>(),
            Err(PortError::InvalidRange(500, 10))
        );
        assert_eq!(
            "70000".parse::<PortRange>(),
            Err(PortError::OutOfRange(70000))
        );
        assert_eq!("0".parse::<PortRange>(), Err(PortError::OutOfRange(0)));
        assert_eq!("".parse::<PortRange>(), Err(PortError::Empty));
        assert!("1-2-3".parse::<PortRange>().is_err());
        assert!("-5".parse::<PortRange>().is_err());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = "500-10".parse::<PortRange>().unwrap_err();
        assert!(err.to_string().contains("less than or equal"));
        let err = "70000".parse::<PortRange>().unwrap_err();
        assert!(err.to_string().contains("1-65535"));
    }
}
