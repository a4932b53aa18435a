//! Logging setup for the rollcfg CLI.
//!
//! Logs go to stderr so the resolved JSON on stdout stays pipeable.
//!
//! Level selection, in order:
//! 1. `--verbose`: DEBUG for rollcfg crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. Default: WARN for the engine (export discovery warnings), INFO for the CLI

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "rollcfg_core=debug,rollcfg_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "rollcfg_core=warn,rollcfg_cli=info";

/// Pick the filter directives for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before any logging.
///
/// ```rust,no_run
/// use rollcfg_cli::logger::init_logger;
///
/// init_logger(false, false, true);
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with a custom filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && console::user_attended_stderr())
        .with_writer(std::io::stderr)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_parse() {
        // EnvFilter::new ignores invalid directives, so check the text round-trips
        assert!(filter_for(true, false).to_string().contains("rollcfg_core=debug"));
        assert_eq!(filter_for(false, true).to_string(), "error");
    }
}
