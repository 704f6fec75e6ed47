use std::{path::PathBuf, time::Duration};

/// Everything a benchmark run needs to know, independent of how it was collected.
#[derive(Debug, Clone)]
pub struct Options {
    /// The analysis tool to measure.
    pub tool: PathBuf,
    pub solvers: Vec<String>,
    /// Programs, `test.desc` files or directories containing `test.desc` files.
    pub inputs: Vec<PathBuf>,
    /// Additional `name = arguments` solver definitions.
    pub solver_file: Option<PathBuf>,
    /// `test.desc` files carrying one of these tags are not run.
    pub skip_tags: Vec<String>,
    /// Passed to the tool on every invocation, after the solver arguments.
    pub tool_args: Vec<String>,
    pub timeout: Option<Duration>,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

pub const DEFAULT_TOOL: &str = "cbmc";

pub const DEFAULT_SKIP_TAGS: &[&str] = &["KNOWNBUG", "FUTURE"];

impl Default for Options {
    fn default() -> Self {
        Self {
            tool: PathBuf::from(DEFAULT_TOOL),
            solvers: Vec::new(),
            inputs: Vec::new(),
            solver_file: None,
            skip_tags: DEFAULT_SKIP_TAGS.iter().map(|tag| tag.to_string()).collect(),
            tool_args: Vec::new(),
            timeout: None,
            shuffle: false,
            seed: None,
        }
    }
}

impl Options {
    pub fn default_with_tool(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            ..Default::default()
        }
    }
}
