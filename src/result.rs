use std::{fmt::Display, time::Duration};

use derivative::Derivative;

use crate::case::BenchmarkCase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Succeeded,
    /// The tool ran but exited non-zero, `exit_code` is `None` when it was killed by a signal.
    Failed { exit_code: Option<i32> },
    /// The tool could not be launched, or could not be waited on.
    ExecutionError { message: String },
    TimedOut,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Succeeded => f.write_str("succeeded"),
            Status::Failed {
                exit_code: Some(code),
            } => write!(f, "failed (exit {})", code),
            Status::Failed { exit_code: None } => f.write_str("failed (signal)"),
            Status::ExecutionError { .. } => f.write_str("execution error"),
            Status::TimedOut => f.write_str("timed out"),
        }
    }
}

/// What the tool reported about the program, taken from its last verification summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Successful,
    Failed,
    Error,
    Unknown,
}

impl Verdict {
    pub fn from_output(stdout: &str) -> Verdict {
        stdout
            .lines()
            .rev()
            .find_map(|line| match line.trim() {
                "VERIFICATION SUCCESSFUL" => Some(Verdict::Successful),
                "VERIFICATION FAILED" => Some(Verdict::Failed),
                "VERIFICATION ERROR" => Some(Verdict::Error),
                _ => None,
            })
            .unwrap_or(Verdict::Unknown)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Verdict::Successful => "successful",
            Verdict::Failed => "failed",
            Verdict::Error => "error",
            Verdict::Unknown => "unknown",
        })
    }
}

#[derive(Clone, PartialEq, Eq, Default)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Outcome of running one case.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct RunResult {
    case: BenchmarkCase,
    status: Status,
    elapsed: Duration,
    verdict: Verdict,
    #[derivative(Debug = "ignore")]
    output: Option<CapturedOutput>,
}

impl RunResult {
    pub fn new(
        case: BenchmarkCase,
        status: Status,
        elapsed: Duration,
        output: Option<CapturedOutput>,
    ) -> RunResult {
        let verdict = output
            .as_ref()
            .map_or(Verdict::Unknown, |output| Verdict::from_output(&output.stdout));
        RunResult {
            case,
            status,
            elapsed,
            verdict,
            output,
        }
    }

    pub fn case(&self) -> &BenchmarkCase {
        &self.case
    }

    pub fn input_label(&self) -> &str {
        self.case.input().label()
    }

    pub fn solver_name(&self) -> &str {
        self.case.solver().name()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn output(&self) -> Option<&CapturedOutput> {
        self.output.as_ref()
    }

    /// The tool ran to completion, successfully or not, so the elapsed time is a measurement.
    pub fn completed(&self) -> bool {
        matches!(self.status, Status::Succeeded | Status::Failed { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            Status::Succeeded => Some(0),
            Status::Failed { exit_code } => exit_code,
            _ => None,
        }
    }

    /// Whether the exit code matches the one the input's `test.desc` expects, if it expects one.
    pub fn matches_expectation(&self) -> Option<bool> {
        let expected = self.case.input().expected_exit()?;
        Some(self.exit_code() == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{case::Input, solver::Solver};

    fn case() -> BenchmarkCase {
        BenchmarkCase::new(
            Input::new("case1.c", "case1.c").with_expected_exit(Some(10)),
            Solver::new("z3", vec!["--z3".to_owned()]),
        )
    }

    #[test]
    fn verdict_from_cbmc_output() {
        let stdout = "CBMC version 5.95.1\n** Results:\n[main.assertion.1] line 4 assertion: FAILURE\n\n** 1 of 1 failed (2 iterations)\nVERIFICATION FAILED\n";
        assert_eq!(Verdict::from_output(stdout), Verdict::Failed);
        assert_eq!(
            Verdict::from_output("VERIFICATION SUCCESSFUL\n"),
            Verdict::Successful
        );
        assert_eq!(Verdict::from_output("usage: cbmc file.c"), Verdict::Unknown);
    }

    #[test]
    fn failed_run_keeps_exit_code() {
        let output = CapturedOutput {
            stdout: "VERIFICATION FAILED\n".to_owned(),
            stderr: String::new(),
        };
        let result = RunResult::new(
            case(),
            Status::Failed {
                exit_code: Some(10),
            },
            Duration::from_millis(120),
            Some(output),
        );
        assert!(result.completed());
        assert_eq!(result.exit_code(), Some(10));
        assert_eq!(result.verdict(), Verdict::Failed);
        assert_eq!(result.matches_expectation(), Some(true));
        assert_eq!(result.status().to_string(), "failed (exit 10)");
    }

    #[test]
    fn execution_error_is_not_a_measurement() {
        let result = RunResult::new(
            case(),
            Status::ExecutionError {
                message: "Failed to launch 'cbmc'".to_owned(),
            },
            Duration::ZERO,
            None,
        );
        assert!(!result.completed());
        assert_eq!(result.verdict(), Verdict::Unknown);
        assert_eq!(result.matches_expectation(), Some(false));
    }
}
