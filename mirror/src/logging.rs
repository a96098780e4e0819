//! Tracing setup shared by the binaries.
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`. The journal file
//! is the only product output and is unaffected by the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "mirror=info,mirror_ui=info";

/// Initialize the global tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to `default_filter`.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=mirror=debug mirror-ui --port 3001
/// ```
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
