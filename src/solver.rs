use std::{collections::BTreeMap, fmt::Display, fs, path::Path};

use itertools::Itertools;

use crate::{error::ConfigurationError, parser::parse_solver_file};

/// A solver back end: a name and the tool arguments that select it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Solver {
    name: String,
    args: Vec<String>,
}

impl Solver {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Solver {
        Solver {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// CBMC flags for each back end it ships with.
const BUILTIN_SOLVERS: &[(&str, &[&str])] = &[
    ("minisat", &[]),
    ("cadical", &["--sat-solver", "cadical"]),
    ("glucose", &["--sat-solver", "glucose"]),
    ("z3", &["--z3"]),
    ("cvc4", &["--cvc4"]),
    ("cvc5", &["--cvc5"]),
    ("bitwuzla", &["--bitwuzla"]),
    ("boolector", &["--boolector"]),
    ("mathsat", &["--mathsat"]),
    ("yices", &["--yices"]),
    ("cprover-smt2", &["--cprover-smt2"]),
    (
        "incremental-z3",
        &["--incremental-smt2-solver", "z3 --smt2 -in"],
    ),
    (
        "incremental-cvc5",
        &[
            "--incremental-smt2-solver",
            "cvc5 --lang=smt2 --incremental",
        ],
    ),
];

/// The solvers that can be referred to by name.
#[derive(Debug, Clone)]
pub struct SolverCatalogue {
    solvers: BTreeMap<String, Solver>,
}

impl SolverCatalogue {
    pub fn builtin() -> SolverCatalogue {
        let solvers = BUILTIN_SOLVERS
            .iter()
            .map(|(name, args)| {
                let args = args.iter().map(|arg| arg.to_string()).collect();
                (name.to_string(), Solver::new(*name, args))
            })
            .collect();
        SolverCatalogue { solvers }
    }

    /// Built-in solvers, extended or overridden by the definitions in `solver_file`.
    pub fn load(solver_file: Option<&Path>) -> Result<SolverCatalogue, ConfigurationError> {
        let mut catalogue = SolverCatalogue::builtin();
        if let Some(path) = solver_file {
            let file_content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let solvers =
                parse_solver_file(&file_content).map_err(|error| ConfigurationError::Parse {
                    path: path.to_path_buf(),
                    error,
                })?;
            catalogue.extend(solvers);
        }
        Ok(catalogue)
    }

    pub fn extend(&mut self, solvers: impl IntoIterator<Item = Solver>) {
        for solver in solvers {
            self.solvers.insert(solver.name.clone(), solver);
        }
    }

    pub fn resolve(&self, name: &str) -> Result<Solver, ConfigurationError> {
        self.solvers
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownSolver {
                name: name.to_owned(),
                known: self.solvers.keys().join(", "),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Solver> {
        self.solvers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_solvers_map_to_cbmc_flags() {
        let catalogue = SolverCatalogue::builtin();
        assert_eq!(catalogue.resolve("z3").unwrap().args(), ["--z3"]);
        assert!(catalogue.resolve("minisat").unwrap().args().is_empty());
        assert_eq!(
            catalogue.resolve("incremental-z3").unwrap().args(),
            ["--incremental-smt2-solver", "z3 --smt2 -in"]
        );
    }

    #[test]
    fn unknown_solver() {
        let catalogue = SolverCatalogue::builtin();
        match catalogue.resolve("solverX") {
            Err(ConfigurationError::UnknownSolver { name, known }) => {
                assert_eq!(name, "solverX");
                assert!(known.contains("cvc5"));
            }
            other => panic!("expected an unknown solver error, got {:?}", other),
        }
    }

    #[test]
    fn definitions_override_builtins() {
        let mut catalogue = SolverCatalogue::builtin();
        catalogue.extend([
            Solver::new("z3", vec!["--smt2".to_owned(), "--z3".to_owned()]),
            Solver::new("solverA", vec![]),
        ]);
        assert_eq!(catalogue.resolve("z3").unwrap().args(), ["--smt2", "--z3"]);
        assert_eq!(catalogue.resolve("solverA").unwrap().name(), "solverA");
    }

    #[test]
    fn missing_solver_file() {
        let result = SolverCatalogue::load(Some(Path::new("./does/not/exist.solvers")));
        assert!(matches!(result, Err(ConfigurationError::Io { .. })));
    }
}
