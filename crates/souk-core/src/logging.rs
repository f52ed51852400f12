//! Logging initialization.
//!
//! Host applications call this once at startup; tests may call it to get
//! log output during debugging. Subsequent calls are no-ops.

/// Initialize a `tracing` subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG` when set, defaulting to debug-level
/// output for the souk crates and info elsewhere. Safe to call more than
/// once; only the first call installs a subscriber.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "souk_core=debug,souk_memory_storage=debug,info".into()),
        )
        .try_init();
}
