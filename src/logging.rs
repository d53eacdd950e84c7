//! Logging setup
//!
//! Embedders that already run a `tracing` subscriber can skip this; the
//! bridge only emits events and never installs a subscriber on its own.

use tracing_subscriber::EnvFilter;

/// Initialize a console subscriber honoring `RUST_LOG`
///
/// Defaults to `info` when `RUST_LOG` is unset. Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
