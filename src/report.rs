use std::io::{self, Write};

use clap::ValueEnum;
use pretty::{BoxAllocator, DocAllocator, DocBuilder};

use crate::{
    aggregate::Report,
    result::{RunResult, Status},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Aligned columns followed by a summary per solver.
    Table,
    Csv,
}

const WIDTH: usize = 120;

const HEADER: [&str; 5] = ["INPUT", "SOLVER", "STATUS", "TIME (s)", "VERDICT"];

const SUMMARY_HEADER: [&str; 5] = ["SOLVER", "COMPLETED", "UNSUCCESSFUL", "TOTAL (s)", "MEAN (s)"];

/// Writes `report` to `sink`, sorted by input and then solver.
pub fn render<W: Write>(report: &Report, format: Format, sink: W) -> io::Result<()> {
    match format {
        Format::Table => render_table(report, sink),
        Format::Csv => render_csv(report, sink),
    }
}

fn seconds(result: &RunResult) -> String {
    match result.status() {
        Status::ExecutionError { .. } => "-".to_owned(),
        _ => format!("{:.3}", result.elapsed().as_secs_f64()),
    }
}

fn table_row(result: &RunResult) -> [String; 5] {
    [
        result.input_label().to_owned(),
        result.solver_name().to_owned(),
        result.status().to_string(),
        seconds(result),
        result.verdict().to_string(),
    ]
}

/// Pads every column to its widest cell. Columns listed in `right_aligned` are right aligned.
fn columns<'a, D: DocAllocator<'a>>(
    allocator: &'a D,
    header: [&str; 5],
    right_aligned: &[usize],
    rows: &[[String; 5]],
) -> DocBuilder<'a, D, ()>
where
    D::Doc: Clone,
{
    let mut widths = header.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = header.map(str::to_owned);
    let lines = std::iter::once(&header).chain(rows).map(|row| {
        let cells = row.iter().zip(widths).enumerate().map(|(column, (cell, width))| {
            if right_aligned.contains(&column) {
                format!("{:>width$}", cell, width = width)
            } else {
                format!("{:<width$}", cell, width = width)
            }
        });
        allocator.text(cells.collect::<Vec<_>>().join("  ").trim_end().to_owned())
    });
    allocator.intersperse(lines, allocator.hardline())
}

fn render_table<W: Write>(report: &Report, mut sink: W) -> io::Result<()> {
    let allocator = BoxAllocator;

    if report.is_empty() {
        writeln!(sink, "No results.")?;
        return sink.flush();
    }

    let rows = report.rows().map(table_row).collect::<Vec<_>>();
    let mut doc = columns(&allocator, HEADER, &[3], &rows).append(allocator.hardline());

    let summaries = report
        .solver_summaries()
        .into_iter()
        .map(|summary| {
            [
                summary.solver,
                summary.completed.to_string(),
                summary.unsuccessful.to_string(),
                format!("{:.3}", summary.total.as_secs_f64()),
                summary
                    .mean_seconds
                    .map_or("-".to_owned(), |mean| format!("{:.3}", mean)),
            ]
        })
        .collect::<Vec<_>>();
    doc = doc
        .append(allocator.hardline())
        .append(allocator.text("Solver summary:"))
        .append(
            allocator
                .hardline()
                .append(columns(&allocator, SUMMARY_HEADER, &[1, 2, 3, 4], &summaries))
                .nest(2),
        )
        .append(allocator.hardline());

    let problems = report
        .rows()
        .filter_map(|result| match result.status() {
            Status::ExecutionError { message } => Some(allocator.text(format!(
                "{} / {}: {}",
                result.input_label(),
                result.solver_name(),
                message
            ))),
            _ => None,
        })
        .collect::<Vec<_>>();
    if !problems.is_empty() {
        doc = doc
            .append(allocator.hardline())
            .append(allocator.text("Execution errors:"))
            .append(
                allocator
                    .hardline()
                    .append(allocator.intersperse(problems, allocator.hardline()))
                    .nest(2),
            )
            .append(allocator.hardline());
    }

    let statistics = report.statistics();
    doc = doc.append(allocator.hardline()).append(allocator.text(format!(
        "{} cases: {} succeeded, {} failed, {} execution errors, {} timed out, {:.3}s in total",
        statistics.number_of_cases,
        statistics.number_of_successes,
        statistics.number_of_failures,
        statistics.number_of_execution_errors,
        statistics.number_of_timeouts,
        statistics.total_runtime.as_secs_f64()
    )));

    writeln!(sink, "{}", doc.1.pretty(WIDTH))?;
    sink.flush()
}

fn render_csv<W: Write>(report: &Report, sink: W) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record([
        "input",
        "solver",
        "status",
        "exit_code",
        "elapsed_seconds",
        "verdict",
        "expected_exit",
        "message",
    ])?;

    for result in report.rows() {
        let status = match result.status() {
            Status::Succeeded => "succeeded",
            Status::Failed { .. } => "failed",
            Status::ExecutionError { .. } => "execution_error",
            Status::TimedOut => "timed_out",
        };
        let message = match result.status() {
            Status::ExecutionError { message } => message.as_str(),
            _ => "",
        };
        let exit_code = result
            .exit_code()
            .map_or(String::new(), |code| code.to_string());
        let elapsed = format!("{:.6}", result.elapsed().as_secs_f64());
        let verdict = result.verdict().to_string();
        let expected_exit = result
            .case()
            .input()
            .expected_exit()
            .map_or(String::new(), |code| code.to_string());

        writer.write_record([
            result.input_label(),
            result.solver_name(),
            status,
            exit_code.as_str(),
            elapsed.as_str(),
            verdict.as_str(),
            expected_exit.as_str(),
            message,
        ])?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use slog::{o, Logger};

    use super::*;
    use crate::{
        aggregate::aggregate,
        case::{BenchmarkCase, Input},
        result::CapturedOutput,
        solver::Solver,
    };

    fn result(input: &str, solver: &str, status: Status, millis: u64) -> RunResult {
        let output = match status {
            Status::ExecutionError { .. } => None,
            _ => Some(CapturedOutput {
                stdout: "VERIFICATION SUCCESSFUL\n".to_owned(),
                stderr: String::new(),
            }),
        };
        RunResult::new(
            BenchmarkCase::new(Input::new(input, input), Solver::new(solver, vec![])),
            status,
            Duration::from_millis(millis),
            output,
        )
    }

    fn report() -> Report {
        aggregate(
            vec![
                result("case1.c", "solverB", Status::Succeeded, 1500),
                result(
                    "case1.c",
                    "solverA",
                    Status::ExecutionError {
                        message: "Failed to launch 'cbmc'".to_owned(),
                    },
                    0,
                ),
            ],
            &Logger::root(slog::Discard, o!()),
        )
    }

    fn rendered(report: &Report, format: Format) -> String {
        let mut sink = Vec::new();
        render(report, format, &mut sink).unwrap();
        String::from_utf8(sink).unwrap()
    }

    #[test]
    fn table() {
        let output = rendered(&report(), Format::Table);
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[0],
            "INPUT    SOLVER   STATUS           TIME (s)  VERDICT"
        );
        assert_eq!(
            lines[1],
            "case1.c  solverA  execution error         -  unknown"
        );
        assert_eq!(
            lines[2],
            "case1.c  solverB  succeeded           1.500  successful"
        );
        let summary = lines
            .iter()
            .position(|line| *line == "Solver summary:")
            .unwrap();
        assert_eq!(
            lines[summary + 1..summary + 4],
            [
                "  SOLVER   COMPLETED  UNSUCCESSFUL  TOTAL (s)  MEAN (s)",
                "  solverB          1             0      1.500     1.500",
                "  solverA          0             1      0.000         -",
            ]
        );
        assert!(output.contains("  case1.c / solverA: Failed to launch 'cbmc'"));
        assert!(output.contains(
            "2 cases: 1 succeeded, 0 failed, 1 execution errors, 0 timed out, 1.500s in total"
        ));
    }

    #[test]
    fn empty_table() {
        let report = aggregate(Vec::new(), &Logger::root(slog::Discard, o!()));
        assert_eq!(rendered(&report, Format::Table), "No results.\n");
    }

    #[test]
    fn csv() {
        let output = rendered(&report(), Format::Csv);
        assert_eq!(
            output,
            "input,solver,status,exit_code,elapsed_seconds,verdict,expected_exit,message\n\
             case1.c,solverA,execution_error,,0.000000,unknown,,Failed to launch 'cbmc'\n\
             case1.c,solverB,succeeded,0,1.500000,successful,,\n"
        );
    }
}
