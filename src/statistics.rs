use std::time::Duration;

use crate::result::{RunResult, Status};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub number_of_cases: u32,
    pub number_of_successes: u32,
    pub number_of_failures: u32,
    pub number_of_execution_errors: u32,
    pub number_of_timeouts: u32,
    pub total_runtime: Duration,
}

impl Statistics {
    pub fn measure(&mut self, result: &RunResult) {
        self.number_of_cases += 1;
        self.total_runtime += result.elapsed();
        match result.status() {
            Status::Succeeded => self.number_of_successes += 1,
            Status::Failed { .. } => self.number_of_failures += 1,
            Status::ExecutionError { .. } => self.number_of_execution_errors += 1,
            Status::TimedOut => self.number_of_timeouts += 1,
        }
    }

    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a RunResult>) -> Statistics {
        let mut statistics = Statistics::default();
        for result in results {
            statistics.measure(result);
        }
        statistics
    }
}
