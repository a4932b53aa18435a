//! Subscriber setup for binaries embedding the engine.
//!
//! Only available with the `logging` feature. Libraries should install their
//! own subscriber and leave this alone.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Variable read by [`init_logging_from_env`].
pub const LEVEL_VAR: &str = "ROLLCFG_LOG";

/// Verbosity of engine output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    /// Errors plus export discovery warnings
    #[default]
    Warn,
    Info,
    Debug,
    /// Per-package discovery decisions
    Trace,
}

impl LogLevel {
    const NAMES: [(LogLevel, &'static str); 6] = [
        (LogLevel::Silent, "off"),
        (LogLevel::Error, "error"),
        (LogLevel::Warn, "warn"),
        (LogLevel::Info, "info"),
        (LogLevel::Debug, "debug"),
        (LogLevel::Trace, "trace"),
    ];

    fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    pub fn as_str(self) -> &'static str {
        Self::NAMES
            .iter()
            .find_map(|(level, name)| (*level == self).then_some(*name))
            .unwrap_or("warn")
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = match input.to_ascii_lowercase().as_str() {
            "silent" => "off".to_string(),
            "warning" => "warn".to_string(),
            other => other.to_string(),
        };
        Self::NAMES
            .iter()
            .find_map(|(level, name)| (*name == wanted).then_some(*level))
            .ok_or_else(|| format!("unknown log level `{input}`"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install a global compact subscriber at `level`. `RUST_LOG` directives are
/// layered on top. Only the first call in a process has any effect.
///
/// ```rust,no_run
/// use rollcfg_core::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level.as_filter().into())
            .from_env_lossy();
        install(filter);
    });
}

/// Like [`init_logging`], with the level taken from `ROLLCFG_LOG`
/// (`off`, `error`, `warn`, `info`, `debug`, `trace`). Unset or unknown
/// values mean [`LogLevel::Warn`].
pub fn init_logging_from_env() {
    let level = std::env::var(LEVEL_VAR)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();
    init_logging(level);
}

fn install(filter: EnvFilter) {
    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry().with(filter).with(layer).init();
}
