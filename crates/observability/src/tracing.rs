//! Tracing/logging initialization.
//!
//! Structured JSON output, filterable through `RUST_LOG`. The fallback
//! coordinator's degradation warnings are the main signal this exists for:
//! they are the only place advisor failures surface.

use tracing_subscriber::EnvFilter;

/// Directive applied when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVE: &str = "info";

/// Initialize tracing/logging for the process.
///
/// JSON lines by default; set `STOCKLINE_LOG_FORMAT=text` for a
/// human-readable stream during local development. Safe to call multiple
/// times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let text = std::env::var("STOCKLINE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("text"))
        .unwrap_or(false);

    let _ = if text {
        builder.try_init()
    } else {
        builder.json().try_init()
    };
}
