//! Logging bootstrap

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::schema::{expand_home, LoggingConfig};

/// Initialize the logging system.
///
/// Stdout gets human-oriented output; a daily-rolled file under the
/// configured directory keeps the full record. The returned guard must stay
/// alive for the process lifetime or buffered file output is lost.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let is_json = config.format.eq_ignore_ascii_case("json");

    let log_dir = expand_home(&config.dir);
    let file_appender = tracing_appender::rolling::daily(log_dir, "intervue.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // is_json is a runtime value, so the layers are boxed to unify types
    let stdout_layer = if is_json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let file_layer = if is_json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_ansi(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_ansi(false)
            .boxed()
    };

    Registry::default()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
