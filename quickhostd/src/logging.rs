//! Diagnostic logging for the host daemon.
//!
//! Logs go to stderr so stdout carries only JSON snapshots.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Log level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Installs the stderr subscriber
///
/// A second call leaves the first subscriber in place.
pub fn init(level: LogLevel) {
    let filter = LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_filter(filter);

    if let Err(err) = Registry::default().with(layer).try_init() {
        eprintln!("Logging already initialized: {}", err);
    }
}
