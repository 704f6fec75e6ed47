mod aggregate;
mod case;
mod config;
mod error;
mod options;
mod parser;
mod report;
mod result;
mod runner;
mod solver;
mod statistics;

pub mod logging;

#[macro_use]
extern crate pest_derive;

use slog::{info, Logger};

pub use aggregate::{aggregate, Report, SolverSummary};
pub use case::{BenchmarkCase, Input};
pub use config::{collect_inputs, cross_product, load as load_cases, shuffle_cases};
pub use error::ConfigurationError;
pub use options::{Options, DEFAULT_SKIP_TAGS, DEFAULT_TOOL};
pub use parser::{parse_solver_file, parse_test_desc, ParseError, TestDesc};
pub use report::{render, Format};
pub use result::{CapturedOutput, RunResult, Status, Verdict};
pub use runner::Runner;
pub use solver::{Solver, SolverCatalogue};
pub use statistics::Statistics;

/// Loads the cases described by `options`, runs each one in turn and collects the results.
///
/// Only configuration problems are returned as errors. Cases whose tool fails, cannot be
/// launched or runs out of time are part of the report.
pub fn benchmark(options: &Options, logger: &Logger) -> Result<Report, ConfigurationError> {
    let mut cases = config::load(options, logger)?;
    if options.shuffle {
        info!(logger, "shuffling execution order"; "seed" => options.seed);
        config::shuffle_cases(&mut cases, options.seed);
    }
    Ok(run_cases(&cases, options, logger))
}

/// Runs already configured cases. An empty slice runs nothing and gives an empty report.
pub fn run_cases(cases: &[BenchmarkCase], options: &Options, logger: &Logger) -> Report {
    let runner = Runner::new(options, logger.clone());
    let results = runner.run_all(cases);
    aggregate(results, logger)
}
