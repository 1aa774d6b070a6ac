//! Core type definitions using newtype patterns for type safety.
//!
//! Validation happens once at construction, so code that receives a `Port`,
//! `PortRange` or `Host` never re-checks it.

mod host;
mod port;

pub use host::{Host, HostError};
pub use port::{Port, PortError, PortRange};
