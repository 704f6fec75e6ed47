use std::{
    io::{self, Read},
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

#[cfg(unix)]
use nix::{
    sys::signal::{killpg, Signal},
    unistd::Pid,
};
use slog::{debug, info, warn, Logger};

use crate::{
    case::BenchmarkCase,
    error,
    options::Options,
    result::{CapturedOutput, RunResult, Status},
    statistics::Statistics,
};

/// How often a child running under a time limit is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs the analysis tool for one case at a time.
pub struct Runner<'a> {
    tool: &'a Path,
    tool_args: &'a [String],
    timeout: Option<Duration>,
    logger: Logger,
}

impl<'a> Runner<'a> {
    pub fn new(options: &'a Options, logger: Logger) -> Runner<'a> {
        Runner {
            tool: &options.tool,
            tool_args: &options.tool_args,
            timeout: options.timeout,
            logger,
        }
    }

    /// `<tool> <solver args> <tool args> <input args> <input path>`
    pub fn command(&self, case: &BenchmarkCase) -> Command {
        let mut command = Command::new(self.tool);
        command
            .args(case.solver().args())
            .args(self.tool_args)
            .args(case.input().arguments())
            .arg(case.input().path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Its own process group, so a timeout can kill whatever the tool started as well.
        #[cfg(unix)]
        command.process_group(0);
        command
    }

    /// Runs every case in order, waiting for each to finish before starting the next.
    pub fn run_all(&self, cases: &[BenchmarkCase]) -> Vec<RunResult> {
        let mut statistics = Statistics::default();
        let results = cases
            .iter()
            .enumerate()
            .map(|(index, case)| {
                debug!(self.logger, "running case";
                    "case" => format!("{}/{}", index + 1, cases.len()),
                    "input" => case.input().label(),
                    "solver" => case.solver().name()
                );
                let result = self.run(case);
                statistics.measure(&result);
                result
            })
            .collect();

        info!(self.logger, "benchmark finished";
            "cases" => statistics.number_of_cases,
            "succeeded" => statistics.number_of_successes,
            "failed" => statistics.number_of_failures,
            "execution_errors" => statistics.number_of_execution_errors,
            "timed_out" => statistics.number_of_timeouts,
            "total_seconds" => statistics.total_runtime.as_secs_f64()
        );
        results
    }

    /// Runs one case. Problems with the tool end up in the result's status, never as an error.
    pub fn run(&self, case: &BenchmarkCase) -> RunResult {
        let mut command = self.command(case);

        let start = Instant::now();
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                let message = error::launch_failure(self.tool, &err);
                warn!(self.logger, "{}", message;
                    "input" => case.input().label(),
                    "solver" => case.solver().name()
                );
                return RunResult::new(
                    case.clone(),
                    Status::ExecutionError { message },
                    start.elapsed(),
                    None,
                );
            }
        };

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let exit = self.wait(&mut child, start);
        let elapsed = start.elapsed();

        let output = CapturedOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        let status = match exit {
            Ok(Some(exit)) if exit.success() => Status::Succeeded,
            Ok(Some(exit)) => Status::Failed {
                exit_code: exit.code(),
            },
            Ok(None) => Status::TimedOut,
            Err(err) => Status::ExecutionError {
                message: error::wait_failure(self.tool, &err),
            },
        };

        let result = RunResult::new(case.clone(), status, elapsed, Some(output));
        debug!(self.logger, "case finished";
            "input" => case.input().label(),
            "solver" => case.solver().name(),
            "status" => %result.status(),
            "verdict" => %result.verdict(),
            "seconds" => elapsed.as_secs_f64()
        );
        result
    }

    /// Waits for the child to exit, or kills it once the time limit has passed and returns `None`.
    fn wait(&self, child: &mut Child, start: Instant) -> io::Result<Option<ExitStatus>> {
        // A limit too far away to be represented can never be reached.
        let Some(deadline) = self.timeout.and_then(|timeout| start.checked_add(timeout)) else {
            return child.wait().map(Some);
        };

        loop {
            if let Some(exit) = child.try_wait()? {
                return Ok(Some(exit));
            }
            if Instant::now() >= deadline {
                // The child may exit between try_wait and kill, that still counts as too late.
                kill(child);
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Kills the child together with its process group, which also closes the pipes held by
/// anything the child started.
fn kill(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pid) = i32::try_from(child.id()) {
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
    let _ = child.kill();
}

/// Reads a pipe to the end on its own thread so the child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            // Whatever was read before an error is still worth keeping.
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|reader| reader.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use slog::o;

    use super::*;
    use crate::{case::Input, solver::Solver};

    #[test]
    fn command_line_order() {
        let mut options = Options::default_with_tool("cbmc");
        options.tool_args = vec!["--verbosity".to_owned(), "4".to_owned()];
        let runner = Runner::new(&options, Logger::root(slog::Discard, o!()));

        let case = BenchmarkCase::new(
            Input::new("pointer_subtraction", "regression/pointer_subtraction.c")
                .with_arguments(vec!["--pointer-check".to_owned()]),
            Solver::new(
                "incremental-z3",
                vec![
                    "--incremental-smt2-solver".to_owned(),
                    "z3 --smt2 -in".to_owned(),
                ],
            ),
        );
        let command = runner.command(&case);

        assert_eq!(command.get_program(), OsStr::new("cbmc"));
        assert_eq!(
            command.get_args().collect::<Vec<_>>(),
            vec![
                "--incremental-smt2-solver",
                "z3 --smt2 -in",
                "--verbosity",
                "4",
                "--pointer-check",
                "regression/pointer_subtraction.c",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreachable_time_limit_waits_for_exit() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("case1.c");
        std::fs::write(&script, "exit 0\n").unwrap();

        let mut options = Options::default_with_tool("sh");
        options.timeout = Some(Duration::MAX);
        let runner = Runner::new(&options, Logger::root(slog::Discard, o!()));
        let case = BenchmarkCase::new(Input::new("case1.c", script), Solver::new("solverA", vec![]));

        assert_eq!(*runner.run(&case).status(), Status::Succeeded);
    }
}
