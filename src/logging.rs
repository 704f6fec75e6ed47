use std::path::Path;

use slog::{o, Logger};
use sloggers::{
    file::FileLoggerBuilder,
    terminal::{Destination, TerminalLoggerBuilder},
    types::Severity,
    Build,
};

/// Severity for a number of `-v` flags, or `quiet`.
pub fn severity(verbosity: u8, quiet: bool) -> Severity {
    match (quiet, verbosity) {
        (true, _) => Severity::Warning,
        (false, 0) => Severity::Info,
        (false, 1) => Severity::Debug,
        (false, _) => Severity::Trace,
    }
}

/// Logs to stderr, or to `log_path` (truncated first) when one is given.
pub fn build_logger(level: Severity, log_path: Option<&Path>) -> Result<Logger, sloggers::Error> {
    match log_path {
        Some(path) => {
            let mut builder = FileLoggerBuilder::new(path);
            builder.level(level);
            builder.truncate();
            builder.build()
        }
        None => {
            let mut builder = TerminalLoggerBuilder::new();
            builder.level(level);
            builder.destination(Destination::Stderr);
            builder.build()
        }
    }
}

pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}
