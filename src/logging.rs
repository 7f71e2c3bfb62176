use std::io::stderr;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_DIRECTIVE: &str = "court_vision=info";

/// Install the stderr subscriber used by the binaries. `RUST_LOG` overrides
/// the default `court_vision=info`. Calling it twice is a no-op.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("court_vision=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    };

    // stdout carries the reports
    let _ = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init();
}
