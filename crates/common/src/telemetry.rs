//! Tracing initialization for the Quarry binaries.
//!
//! Library crates emit through the `tracing` facade only; the binaries call
//! [`init_tracing`] once at startup. `RUST_LOG` overrides the default
//! directive.

use tracing_subscriber::EnvFilter;

pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
