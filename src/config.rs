use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use slog::{debug, info, warn, Logger};

use crate::{
    case::{BenchmarkCase, Input},
    error::ConfigurationError,
    options::Options,
    parser::parse_test_desc,
    solver::{Solver, SolverCatalogue},
};

/// Resolves the solvers and inputs named in `options` and pairs every input with every solver.
///
/// Nothing is executed here, so any error returned means no case has run.
pub fn load(options: &Options, logger: &Logger) -> Result<Vec<BenchmarkCase>, ConfigurationError> {
    if options.solvers.is_empty() {
        return Err(ConfigurationError::NoSolvers);
    }
    if options.inputs.is_empty() {
        return Err(ConfigurationError::NoInputs);
    }

    let catalogue = SolverCatalogue::load(options.solver_file.as_deref())?;
    let solvers = options
        .solvers
        .iter()
        .map(|name| catalogue.resolve(name))
        .collect::<Result<Vec<_>, _>>()?;

    let inputs = collect_inputs(&options.inputs, &options.skip_tags, logger)?;

    let cases = cross_product(&inputs, &solvers);
    info!(logger, "configured benchmark";
        "inputs" => inputs.len(),
        "solvers" => solvers.iter().join(","),
        "cases" => cases.len()
    );
    Ok(cases)
}

/// Input-major: all solvers for the first input, then all solvers for the next.
pub fn cross_product(inputs: &[Input], solvers: &[Solver]) -> Vec<BenchmarkCase> {
    inputs
        .iter()
        .cartesian_product(solvers)
        .map(|(input, solver)| BenchmarkCase::new(input.clone(), solver.clone()))
        .collect()
}

pub fn collect_inputs(
    paths: &[PathBuf],
    skip_tags: &[String],
    logger: &Logger,
) -> Result<Vec<Input>, ConfigurationError> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(ConfigurationError::MissingInput(path.clone()));
        }

        if path.is_dir() {
            let descs = find_descs(path)?;
            if descs.is_empty() {
                warn!(logger, "no test.desc files found"; "directory" => %path.display());
            }
            for desc in descs {
                inputs.extend(load_desc(&desc, skip_tags, logger)?);
            }
        } else if is_desc(path) {
            inputs.extend(load_desc(path, skip_tags, logger)?);
        } else {
            inputs.push(Input::new(path.display().to_string(), path.clone()));
        }
    }
    Ok(inputs)
}

fn is_desc(path: &Path) -> bool {
    path.extension().map_or(false, |extension| extension == "desc")
}

/// All `*.desc` files below `directory`, sorted by path. Symlinked directories are not entered.
fn find_descs(directory: &Path) -> Result<Vec<PathBuf>, ConfigurationError> {
    let io_error = |source| ConfigurationError::Io {
        path: directory.to_path_buf(),
        source,
    };

    let mut descs = Vec::new();
    for entry in fs::read_dir(directory).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        if entry.file_type().map_err(io_error)?.is_dir() {
            descs.extend(find_descs(&path)?);
        } else if is_desc(&path) {
            descs.push(path);
        }
    }
    descs.sort();
    Ok(descs)
}

/// The input a `test.desc` describes, or `None` when one of its tags is skipped.
fn load_desc(
    path: &Path,
    skip_tags: &[String],
    logger: &Logger,
) -> Result<Option<Input>, ConfigurationError> {
    let file_content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let desc = parse_test_desc(&file_content).map_err(|error| ConfigurationError::Parse {
        path: path.to_path_buf(),
        error,
    })?;

    if desc.has_any_tag(skip_tags) {
        debug!(logger, "skipping test";
            "desc" => %path.display(),
            "tags" => desc.tags.join(" ")
        );
        return Ok(None);
    }

    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let source = directory.join(&desc.source);
    if !source.exists() {
        return Err(ConfigurationError::MissingInput(source));
    }

    // Regression tests are known by their directory, unless it holds several descs.
    let label = if path.file_name().map_or(false, |name| name == "test.desc") {
        directory.display().to_string()
    } else {
        path.display().to_string()
    };

    Ok(Some(
        Input::new(label, source)
            .with_arguments(desc.arguments)
            .with_expected_exit(desc.expected_exit),
    ))
}

/// Randomises execution order, reproducibly when a seed is given.
pub fn shuffle_cases(cases: &mut [BenchmarkCase], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    cases.shuffle(&mut rng);
}
