//! Structured Logging Configuration
//!
//! - JSON output for production (LOG_FORMAT=json)
//! - Human-readable output for development (default)
//!
//! # Usage
//!
//! ```rust,ignore
//! use kdc_common::logging::init_logging;
//!
//! fn main() {
//!     init_logging("kdc-provisioner");
//!     tracing::info!(principal = %name, "Created principal");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: "json" for JSON output, anything else for text (default: text)
//! - `RUST_LOG`: log level filter (default: info)
//!   Examples: `RUST_LOG=debug`, `RUST_LOG=kdc_provisioner=trace`

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Initialize logging for the embedding service.
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_logging`] where that can happen.
pub fn init_logging(service_name: &str) {
    if let Err(e) = try_init_logging(service_name) {
        panic!("failed to initialize logging for {}: {}", service_name, e);
    }
}

/// Initialize logging, returning an error instead of panicking when a
/// subscriber is already set (tests call this once per test).
pub fn try_init_logging(_service_name: &str) -> Result<(), TryInitError> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();

    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .flatten_event(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(true),
            )
            .try_init()
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
