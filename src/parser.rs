use pest::{
    error::{Error, LineColLocation},
    iterators::Pair,
    Parser,
};

use crate::solver::Solver;

#[derive(Parser)]
#[grammar = "harness.pest"]
struct HarnessParser;

/// Position and description of a syntax error, lines and columns start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl From<Error<Rule>> for ParseError {
    fn from(error: Error<Rule>) -> Self {
        let (line, col) = match error.line_col {
            LineColLocation::Pos((line, col)) => (line, col),
            LineColLocation::Span((start_line, start_col), _) => (start_line, start_col),
        };
        ParseError {
            line,
            col,
            message: error.variant.message().into_owned(),
        }
    }
}

/// The parts of a CBMC regression `test.desc` the harness needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDesc {
    pub tags: Vec<String>,
    pub source: String,
    pub arguments: Vec<String>,
    pub expected_exit: Option<i32>,
}

impl TestDesc {
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

pub fn parse_test_desc(file_content: &str) -> Result<TestDesc, ParseError> {
    let pairs = HarnessParser::parse(Rule::test_desc, file_content)?;

    let mut desc = TestDesc {
        tags: Vec::new(),
        source: String::new(),
        arguments: Vec::new(),
        expected_exit: None,
    };
    // Patterns after a lone `--` must not match, so they can't say anything about EXIT.
    let mut negated = false;

    for pair in pairs.flat_map(Pair::into_inner) {
        match pair.as_rule() {
            Rule::tags => {
                desc.tags = pair
                    .into_inner()
                    .map(|tag| tag.as_str().to_owned())
                    .collect();
            }
            Rule::source => desc.source = pair.as_str().trim().to_owned(),
            Rule::arguments => desc.arguments = arguments(pair),
            Rule::pattern => {
                let pattern = pair.as_str().trim();
                if pattern == "--" {
                    negated = true;
                } else if !negated && desc.expected_exit.is_none() {
                    desc.expected_exit = expected_exit(pattern);
                }
            }
            _ => {}
        }
    }

    if desc.source.is_empty() {
        return Err(ParseError {
            line: 2,
            col: 1,
            message: "expected the name of a source file".to_owned(),
        });
    }

    Ok(desc)
}

/// Parses `name = arguments` lines into solvers, in file order.
pub fn parse_solver_file(file_content: &str) -> Result<Vec<Solver>, ParseError> {
    let pairs = HarnessParser::parse(Rule::solver_file, file_content)?;

    let solvers = pairs
        .flat_map(Pair::into_inner)
        .filter(|pair| pair.as_rule() == Rule::solver)
        .map(|solver| {
            let mut name = String::new();
            let mut args = Vec::new();
            for part in solver.into_inner() {
                match part.as_rule() {
                    Rule::solver_name => name = part.as_str().to_owned(),
                    Rule::arguments => args = arguments(part),
                    _ => {}
                }
            }
            Solver::new(name, args)
        })
        .collect();
    Ok(solvers)
}

fn arguments(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .map(|argument| {
            argument
                .into_inner()
                .map(|segment| segment.as_str())
                .collect::<String>()
        })
        .collect()
}

fn expected_exit(pattern: &str) -> Option<i32> {
    pattern
        .strip_prefix("^EXIT=")?
        .strip_suffix('$')?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_desc() {
        let file_content = "CORE broken-smt-backend
main.c
--pointer-check --unwind 3 --function 'foo bar'
^EXIT=10$
^SIGNAL=0$
^VERIFICATION FAILED$
--
^warning: ignoring
";
        let desc = parse_test_desc(file_content).unwrap();
        assert_eq!(desc.tags, vec!["CORE", "broken-smt-backend"]);
        assert_eq!(desc.source, "main.c");
        assert_eq!(
            desc.arguments,
            vec!["--pointer-check", "--unwind", "3", "--function", "foo bar"]
        );
        assert_eq!(desc.expected_exit, Some(10));
    }

    #[test]
    fn desc_without_arguments() {
        let desc = parse_test_desc("KNOWNBUG\ntest.c").unwrap();
        assert_eq!(desc.tags, vec!["KNOWNBUG"]);
        assert_eq!(desc.source, "test.c");
        assert!(desc.arguments.is_empty());
        assert_eq!(desc.expected_exit, None);
    }

    #[test]
    fn adjacent_segments_form_one_argument() {
        let desc =
            parse_test_desc("CORE\nmain.c\n--function=\"foo bar\" -D'X=1'2 \"\" --z3\n").unwrap();
        assert_eq!(
            desc.arguments,
            vec!["--function=foo bar", "-DX=12", "", "--z3"]
        );
    }

    #[test]
    fn negated_exit_pattern_is_ignored() {
        let desc = parse_test_desc("CORE\nmain.c\n\n--\n^EXIT=0$\n").unwrap();
        assert_eq!(desc.expected_exit, None);
    }

    #[test]
    fn desc_without_source_is_rejected() {
        let error = parse_test_desc("CORE\n\n--z3\n").unwrap_err();
        assert_eq!(error.line, 2);
    }

    #[test]
    fn unterminated_quote_reports_position() {
        let error = parse_test_desc("CORE\nmain.c\n--function \"main\n").unwrap_err();
        assert_eq!(error.line, 3);
    }

    #[test]
    fn solver_file() {
        let file_content = r#"
# local builds
z3-local = --incremental-smt2-solver "/opt/z3/bin/z3 --smt2 -in"
  cadical=--sat-solver cadical

plain =
"#;
        let solvers = parse_solver_file(file_content).unwrap();
        assert_eq!(
            solvers,
            vec![
                Solver::new(
                    "z3-local",
                    vec![
                        "--incremental-smt2-solver".to_owned(),
                        "/opt/z3/bin/z3 --smt2 -in".to_owned()
                    ]
                ),
                Solver::new(
                    "cadical",
                    vec!["--sat-solver".to_owned(), "cadical".to_owned()]
                ),
                Solver::new("plain", vec![]),
            ]
        );
    }

    #[test]
    fn solver_file_line_without_equals() {
        let error = parse_solver_file("z3 = --z3\ncvc5 --cvc5\n").unwrap_err();
        assert_eq!(error.line, 2);
    }
}
