use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use itertools::Itertools;
use lib::{logging, Format, Options, SolverCatalogue, DEFAULT_SKIP_TAGS, DEFAULT_TOOL};
use slog::{error, Logger};

const LONG_ABOUT: &str = "Measure the performance of a verification tool (cbmc by default) across a \
selection of solver back ends.

Every input is run once with every selected solver, one after the other, and the wall-clock \
time and exit status of each run are reported. This is meant to be run locally by maintainers, \
not from CI.

Inputs are program files, regression test.desc files, or directories searched for test.desc \
files. A failing or missing tool is reported per case; only configuration problems make the \
harness itself exit with an error.";

#[derive(Parser, Debug)]
#[command(name = "backend-performance", version, about, long_about = LONG_ABOUT)]
struct Cli {
    /// Solvers to compare, comma separated or repeated (see --list-solvers)
    #[arg(
        short,
        long = "solver",
        value_name = "NAME",
        value_delimiter = ',',
        required_unless_present = "list_solvers"
    )]
    solvers: Vec<String>,

    /// Programs, test.desc files, or directories containing test.desc files
    #[arg(value_name = "INPUT", required_unless_present = "list_solvers")]
    inputs: Vec<PathBuf>,

    /// The verification tool to measure
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TOOL)]
    tool: PathBuf,

    /// Extra argument passed to the tool on every run
    #[arg(long = "tool-arg", value_name = "ARG", allow_hyphen_values = true)]
    tool_args: Vec<String>,

    /// File with additional `name = arguments` solver definitions
    #[arg(long, value_name = "PATH")]
    solver_file: Option<PathBuf>,

    /// Skip test.desc files carrying this tag
    #[arg(long = "skip-tag", value_name = "TAG", default_values = DEFAULT_SKIP_TAGS)]
    skip_tags: Vec<String>,

    /// Kill a run after this many seconds and report it as timed out
    #[arg(long, value_name = "SECONDS", value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Run the cases in random order, the report stays sorted
    #[arg(long)]
    shuffle: bool,

    /// Seed for --shuffle, to repeat an order
    #[arg(long, requires = "shuffle")]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// More logging, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the log to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_path: Option<PathBuf>,

    /// Print the known solvers and the arguments they pass, then exit
    #[arg(long)]
    list_solvers: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            tool: self.tool.clone(),
            solvers: self.solvers.clone(),
            inputs: self.inputs.clone(),
            solver_file: self.solver_file.clone(),
            skip_tags: self.skip_tags.clone(),
            tool_args: self.tool_args.clone(),
            timeout: self.timeout,
            shuffle: self.shuffle,
            seed: self.seed,
        }
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("'{}' is not a positive number of seconds", value));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("'{}' is too many seconds", value))
}

/// How a harness run ended. Failing cases still count as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    ConfigurationError,
    OutputError,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => ExitCode::SUCCESS,
            Outcome::ConfigurationError | Outcome::OutputError => ExitCode::FAILURE,
        }
    }
}

fn list_solvers(cli: &Cli, logger: &Logger) -> Outcome {
    let catalogue = match SolverCatalogue::load(cli.solver_file.as_deref()) {
        Ok(catalogue) => catalogue,
        Err(err) => return configuration_failure(cli, logger, &err),
    };

    let mut stdout = io::stdout().lock();
    for solver in catalogue.iter() {
        let args = solver
            .args()
            .iter()
            .map(|arg| {
                if arg.contains(char::is_whitespace) {
                    format!("\"{}\"", arg)
                } else {
                    arg.clone()
                }
            })
            .join(" ");
        if writeln!(stdout, "{:<18}{}", solver.name(), args).is_err() {
            return Outcome::OutputError;
        }
    }
    Outcome::Completed
}

fn configuration_failure(cli: &Cli, logger: &Logger, err: &dyn std::error::Error) -> Outcome {
    error!(logger, "{}", err);
    // The log went to a file, the user still needs to see why nothing ran.
    if cli.log_path.is_some() {
        eprintln!("error: {}", err);
    }
    Outcome::ConfigurationError
}

fn run(cli: &Cli, logger: &Logger) -> Outcome {
    if cli.list_solvers {
        return list_solvers(cli, logger);
    }

    let report = match lib::benchmark(&cli.options(), logger) {
        Ok(report) => report,
        Err(err) => return configuration_failure(cli, logger, &err),
    };

    let written = match &cli.output {
        Some(path) => File::create(path)
            .and_then(|file| lib::render(&report, cli.format, BufWriter::new(file))),
        None => lib::render(&report, cli.format, io::stdout().lock()),
    };
    if let Err(err) = written {
        error!(logger, "unable to write the report: {}", err);
        eprintln!("error: unable to write the report: {}", err);
        return Outcome::OutputError;
    }

    Outcome::Completed
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = logging::severity(cli.verbose, cli.quiet);
    let logger = match logging::build_logger(level, cli.log_path.as_deref()) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("error: unable to set up logging: {}", err);
            return ExitCode::FAILURE;
        }
    };

    run(&cli, &logger).into()
}
