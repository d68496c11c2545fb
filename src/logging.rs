use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber: readable console output plus a
/// JSON file log rotated daily under `logs/`.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "reports.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::from_default_env().add_directive("mobilization_reports=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    // The file writer flushes only while its guard lives; leak it so log
    // lines keep landing until process exit.
    std::mem::forget(guard);
}
