//! Tracing bootstrap.

use tracing_subscriber::EnvFilter;

/// Filter directives for encore's own events, e.g. `encore_recorder=debug`
pub const LOG_ENV: &str = "ENCORE_LOG";
/// Set to `json` for JSON log lines
pub const LOG_FORMAT_ENV: &str = "ENCORE_LOG_FORMAT";

/// Install a fmt subscriber filtered by `ENCORE_LOG`
///
/// Does nothing if a global subscriber is already set. Output goes through
/// the test writer so libtest captures it.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true);
    let result = match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("subscriber already installed");
    }
}
