use std::{collections::BTreeMap, time::Duration};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use slog::{debug, warn, Logger};

use crate::{
    result::{RunResult, Status},
    statistics::Statistics,
};

/// Results of a benchmark run, kept in the order they were produced and indexed by
/// `(input label, solver name)`.
#[derive(Debug, Clone, Default)]
pub struct Report {
    results: Vec<RunResult>,
    index: BTreeMap<(String, String), Vec<usize>>,
}

/// How one solver did over all inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSummary {
    pub solver: String,
    /// Runs where the tool exited by itself, successfully or not.
    pub completed: usize,
    /// Runs that failed, could not be launched or timed out.
    pub unsuccessful: usize,
    /// Sum of the completed runs' times.
    pub total: Duration,
    pub mean_seconds: Option<f64>,
}

pub fn aggregate(results: Vec<RunResult>, logger: &Logger) -> Report {
    if results.is_empty() {
        warn!(logger, "no benchmark results, the report is empty");
    }

    let mut index: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (position, result) in results.iter().enumerate() {
        index
            .entry((
                result.input_label().to_owned(),
                result.solver_name().to_owned(),
            ))
            .or_default()
            .push(position);
    }

    debug!(logger, "aggregated results"; "results" => results.len(), "keys" => index.len());
    Report { results, index }
}

impl Report {
    /// Results in the order the runner produced them.
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results sorted by input and then solver. Results sharing both keep their runner order.
    pub fn rows(&self) -> impl Iterator<Item = &RunResult> + '_ {
        self.index
            .values()
            .flatten()
            .map(|position| &self.results[*position])
    }

    pub fn get<'a>(
        &'a self,
        input: &str,
        solver: &str,
    ) -> impl Iterator<Item = &'a RunResult> + 'a {
        self.index
            .get(&(input.to_owned(), solver.to_owned()))
            .into_iter()
            .flatten()
            .map(|position| &self.results[*position])
    }

    pub fn inputs(&self) -> Vec<&str> {
        self.index
            .keys()
            .map(|(input, _)| input.as_str())
            .dedup()
            .collect()
    }

    pub fn solvers(&self) -> Vec<&str> {
        self.index
            .keys()
            .map(|(_, solver)| solver.as_str())
            .sorted()
            .dedup()
            .collect()
    }

    pub fn by_solver(&self) -> BTreeMap<&str, Vec<&RunResult>> {
        let mut groups: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for result in self.rows() {
            groups.entry(result.solver_name()).or_default().push(result);
        }
        groups
    }

    /// The quickest completed run for `input`, the earliest one on equal times.
    pub fn fastest(&self, input: &str) -> Option<&RunResult> {
        self.rows()
            .filter(|result| result.input_label() == input && result.completed())
            .min_by_key(|result| result.elapsed())
    }

    /// One summary per solver, lowest mean time first. Solvers without a completed run come last.
    pub fn solver_summaries(&self) -> Vec<SolverSummary> {
        self.by_solver()
            .into_iter()
            .map(|(solver, results)| {
                let completed = results
                    .iter()
                    .filter(|result| result.completed())
                    .collect::<Vec<_>>();
                let total: Duration = completed.iter().map(|result| result.elapsed()).sum();
                let mean_seconds = if completed.is_empty() {
                    None
                } else {
                    Some(total.as_secs_f64() / completed.len() as f64)
                };
                SolverSummary {
                    solver: solver.to_owned(),
                    completed: completed.len(),
                    unsuccessful: results
                        .iter()
                        .filter(|result| *result.status() != Status::Succeeded)
                        .count(),
                    total,
                    mean_seconds,
                }
            })
            .sorted_by_key(|summary| {
                (
                    summary.mean_seconds.is_none(),
                    summary.mean_seconds.map(OrderedFloat),
                    summary.solver.clone(),
                )
            })
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_results(&self.results)
    }
}
