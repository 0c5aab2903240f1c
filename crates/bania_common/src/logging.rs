//! Logging setup for the Bania services.
//!
//! One `tracing` subscriber is installed per process: an `EnvFilter` (defaults
//! to `bania=<level>`, overridable through `RUST_LOG`), a formatted stdout layer
//! and, when `logging.file_dir` is set, a daily rolling file written through a
//! non-blocking worker.

use bania_config::LoggingConfig;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "bania.log";

/// Initialize from the `[logging]` config section.
///
/// The returned guard must be held for the lifetime of the process, dropping
/// it flushes and stops the file writer.
pub fn init_with_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = parse_level(&config.level);

    let (file_layer, guard) = match config.file_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: tests and embedding binaries may have installed a subscriber already
    let result = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(file_layer)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
    guard
}

/// Unknown level names fall back to INFO.
pub fn parse_level(level: &str) -> Level {
    level.trim().parse::<Level>().unwrap_or(Level::INFO)
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    for target in ["bania", "tower_http"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}
