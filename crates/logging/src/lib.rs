#![warn(missing_docs)]

//! Logging setup for the popcorn binaries.
//!
//! [`LogArgs`] is flattened into each CLI; [`init`] turns it into a stderr
//! subscriber whose level flags apply to our own crates only, so webview and
//! windowing dependencies stay quiet unless asked for with `--log-filter`.

use std::{env, io};

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Targets whose verbosity the level flags control.
const OUR_CRATES: &[&str] = &["popcorn", "popcorn_engine", "config", "logging"];

/// Level used when neither flags nor `RUST_LOG` say otherwise.
const DEFAULT_LEVEL: &str = "info";

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single log level for our crates (error|warn|info|debug|trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Raw tracing filter directive, e.g. "popcorn_engine=trace,wry=debug"
    #[arg(long, value_name = "DIRECTIVE")]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter directive for these flags.
    ///
    /// An explicit `--log-filter` wins, then `--trace`/`--debug`/`--log-level`,
    /// then `RUST_LOG`, then [`DEFAULT_LEVEL`] for our crates.
    pub fn directive(&self) -> String {
        self.directive_with(env::var("RUST_LOG").ok())
    }

    /// [`Self::directive`] with the `RUST_LOG` value supplied by the caller.
    fn directive_with(&self, rust_log: Option<String>) -> String {
        if let Some(filter) = &self.log_filter {
            return filter.clone();
        }
        let level = if self.trace {
            Some("trace")
        } else if self.debug {
            Some("debug")
        } else {
            self.log_level.as_deref()
        };
        match (level, rust_log) {
            (Some(level), _) => scoped(level),
            (None, Some(env)) => env,
            (None, None) => scoped(DEFAULT_LEVEL),
        }
    }
}

/// `level` applied to each of our crates.
fn scoped(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    OUR_CRATES
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the process-wide subscriber writing compact lines to stderr.
///
/// Later calls are ignored.
pub fn init(args: &LogArgs) {
    let directive = args.directive();
    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(&directive))
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .try_init();
    if installed.is_ok() {
        tracing::debug!(filter = %directive, "logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_covers_our_crates() {
        assert_eq!(
            scoped("DEBUG"),
            "popcorn=debug,popcorn_engine=debug,config=debug,logging=debug"
        );
    }

    #[test]
    fn explicit_filter_wins() {
        let args = LogArgs {
            log_level: Some("warn".into()),
            log_filter: Some("popcorn=trace".into()),
            ..LogArgs::default()
        };
        assert_eq!(args.directive_with(Some("wry=debug".into())), "popcorn=trace");
    }

    #[test]
    fn flags_beat_rust_log() {
        let rust_log = || Some("wry=debug".to_string());
        let trace = LogArgs {
            trace: true,
            ..LogArgs::default()
        };
        assert_eq!(trace.directive_with(rust_log()), scoped("trace"));
        let level = LogArgs {
            log_level: Some("error".into()),
            ..LogArgs::default()
        };
        assert_eq!(level.directive_with(rust_log()), scoped("error"));
    }

    #[test]
    fn rust_log_then_default() {
        let args = LogArgs::default();
        assert_eq!(args.directive_with(Some("wry=debug".into())), "wry=debug");
        assert_eq!(args.directive_with(None), scoped("info"));
    }
}
