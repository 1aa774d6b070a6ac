//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;

/// Filter used when none is given or the given one does not parse.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global `tracing` subscriber, writing to stderr.
///
/// Report output goes to stdout, so logs never interleave with JSON or CSV.
/// Calling this more than once is harmless.
pub fn init(filter: Option<&str>) {
    let filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(Some("not a [valid filter"));
        init(None);
        tracing::warn!("still logging");
    }
}
