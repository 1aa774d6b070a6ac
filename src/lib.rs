//! # hostcheck - Basic Host Diagnostics
//!
//! hostcheck checks whether TCP or UDP ports on a host are reachable,
//! reports CPU details and times command execution.
//!
//! ## Features
//!
//! - **Port Checks**: TCP connect and UDP probes with a tri-state verdict
//!   (open, closed, indeterminate)
//! - **Bounded Concurrency**: Fixed-size worker pool with optional rate limiting
//! - **Deterministic Reports**: Exactly one result per port, ordered by port
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use hostcheck::scanner::{scan_range, Protocol, ScanJob};
//! use hostcheck::types::{Host, PortRange};
//!
//! #[tokio::main]
//! async fn main() {
//!     let job = ScanJob::new(
//!         Host::parse("127.0.0.1").unwrap(),
//!         Protocol::Tcp,
//!         "20-25".parse::<PortRange>().unwrap(),
//!     );
//!     let report = scan_range(job).await.unwrap();
//!
//!     for result in &report {
//!         println!("{} {:?}", result.port, result.reachability);
//!     }
//!     std::process::exit(report.verdict().exit_code().into());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated host, port and port-range newtypes
//! - [`scanner`] - Probers, the worker pool and scan reports
//! - [`config`] - Settings file with per-user defaults
//! - [`cpuinfo`] - CPU detection
//! - [`timer`] - Command timing
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod cpuinfo;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod timer;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, InputError, ProbeError, ScanError};
pub use scanner::{
    probe, scan_range, ProbeRequest, ProbeResult, Protocol, Reachability, ScanJob, ScanReport,
    Verdict,
};
pub use types::{Host, Port, PortRange};
