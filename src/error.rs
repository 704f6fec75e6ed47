use std::{io, path::Path, path::PathBuf};

use thiserror::Error;

use crate::parser::ParseError;

/// Problems found before any case runs. These abort the whole harness.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("No solvers were given, select at least one with --solver")]
    NoSolvers,
    #[error("No inputs were given")]
    NoInputs,
    #[error("{}", missing_input(.0))]
    MissingInput(PathBuf),
    #[error("{}", unknown_solver(.name, .known))]
    UnknownSolver { name: String, known: String },
    #[error("{}", unreadable_file(.path, .source))]
    Io { path: PathBuf, source: io::Error },
    #[error("{}", syntax_error(.path, .error))]
    Parse { path: PathBuf, error: ParseError },
}

pub fn missing_input(path: &Path) -> String {
    format!("Input '{}' does not exist", path.display())
}

pub fn unknown_solver(name: &str, known: &str) -> String {
    format!("Unknown solver '{}', expected one of: {}", name, known)
}

pub fn unreadable_file(path: &Path, error: &io::Error) -> String {
    format!("Unable to read '{}': {}", path.display(), error)
}

pub fn syntax_error(path: &Path, error: &ParseError) -> String {
    format!(
        "{}:{}:{}: {}",
        path.display(),
        error.line,
        error.col,
        error.message
    )
}

// Runner
pub fn launch_failure(tool: &Path, error: &io::Error) -> String {
    format!("Failed to launch '{}': {}", tool.display(), error)
}

pub fn wait_failure(tool: &Path, error: &io::Error) -> String {
    format!("Lost track of '{}' while it was running: {}", tool.display(), error)
}
