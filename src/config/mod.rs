//! Configuration management for hostcheck.
//!
//! Provides XDG-compliant settings discovery and loading.

mod settings;

pub use settings::{AppSettings, Paths};
