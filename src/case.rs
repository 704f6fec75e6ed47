use std::path::{Path, PathBuf};

use crate::solver::Solver;

/// Something to hand to the tool: a program, or the program named by a `test.desc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    label: String,
    path: PathBuf,
    arguments: Vec<String>,
    expected_exit: Option<i32>,
}

impl Input {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Input {
        Input {
            label: label.into(),
            path: path.into(),
            arguments: Vec::new(),
            expected_exit: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Input {
        self.arguments = arguments;
        self
    }

    pub fn with_expected_exit(mut self, expected_exit: Option<i32>) -> Input {
        self.expected_exit = expected_exit;
        self
    }

    /// Name used in reports, ordering is by this label.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tool arguments that belong to this input regardless of the solver.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn expected_exit(&self) -> Option<i32> {
        self.expected_exit
    }
}

/// One (input, solver) pairing to be timed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkCase {
    input: Input,
    solver: Solver,
}

impl BenchmarkCase {
    pub fn new(input: Input, solver: Solver) -> BenchmarkCase {
        BenchmarkCase { input, solver }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }
}
