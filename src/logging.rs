use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact fmt logs filtered by `RUST_LOG` (falls back to `default_filter`).
/// Safe to call when a subscriber is already installed, e.g. by the
/// deployment runtime; the existing one wins.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true))
        .try_init();
}
