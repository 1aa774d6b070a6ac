//! Error types for hostcheck.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::scanner::Protocol;
use crate::types::{HostError, PortError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single probe attempt.
///
/// These never escape a scan: each one is folded into the `ProbeResult`
/// of the port it belongs to. The `Display` text is the cause string that
/// ends up in text and JSON output.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("DNS resolution failed: {0}")]
    Resolution(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Connection refused")]
    Refused,

    #[error("Permission denied (may need root for some operations)")]
    PermissionDenied,

    #[error("OS error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Check failed: {0}")]
    Fault(String),
}

impl ProbeError {
    /// Classify an I/O error raised while opening or using a socket.
    pub fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::ConnectionRefused => Self::Refused,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            std::io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(err),
        }
    }
}

/// Malformed user input, rejected before any socket is opened.
#[derive(Error, Debug)]
pub enum InputError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("timeout must be a positive number of seconds")]
    Timeout,

    #[error("workers must be at least 1")]
    Workers,
}

/// Errors that abort a whole scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid scan job: {0}")]
    InvalidJob(#[from] InputError),

    #[error("scan interrupted after {completed} of {total} ports")]
    Interrupted { completed: usize, total: usize },

    #[error("{job} scan cannot run with a {prober} prober")]
    ProtocolMismatch { job: Protocol, prober: Protocol },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Errors surfaced by CLI subcommand handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to run '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("interrupted by user")]
    Interrupted,
}

impl CliError {
    /// Conventional exit code for user interrupts.
    pub const INTERRUPT_EXIT_CODE: u8 = 130;

    /// Whether the user aborted the command.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Self::Interrupted | Self::Scan(ScanError::Interrupted { .. })
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_interrupt() {
            Self::INTERRUPT_EXIT_CODE
        } else {
            1
        }
    }
}

impl From<PortError> for CliError {
    fn from(err: PortError) -> Self {
        Self::Input(InputError::Port(err))
    }
}

impl From<HostError> for CliError {
    fn from(err: HostError) -> Self {
        Self::Input(InputError::Host(err))
    }
}

/// Result type alias for probe operations.
pub type ProbeOutcome<T> = Result<T, ProbeError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI handlers.
pub type CliResult<T> = Result<T, CliError>;
