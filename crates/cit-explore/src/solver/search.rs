//! Incremental feasibility checks.
//!
//! A [`Feasibility`] oracle loads an [`EncodedSpace`] into one varisat
//! solver and answers "can this partial assignment be extended to a full row
//! that violates no constraint?" by solving under assumptions. The clause
//! database is built once and reused for every query.

use cit_model::Pair;
use varisat::{solver::Solver, ExtendFormula, Lit};

use super::encode::EncodedSpace;

/// Errors during search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("solver error: {0}")]
    Solver(String),

    #[error("pair {0} is outside the parameter space")]
    UnknownPair(Pair),
}

/// SAT-backed oracle for partial assignments.
pub struct Feasibility {
    space: EncodedSpace,
    solver: Solver<'static>,
    queries: u64,
}

impl Feasibility {
    pub fn new(space: EncodedSpace) -> Self {
        let mut solver = Solver::new();
        for clause in space.clauses() {
            solver.add_clause(clause);
        }
        Self {
            space,
            solver,
            queries: 0,
        }
    }

    /// Number of solver calls made so far.
    pub fn queries(&self) -> u64 {
        self.queries
    }

    /// Whether some full row extends `pairs` without violating a constraint.
    pub fn is_feasible(&mut self, pairs: &[Pair]) -> Result<bool, SearchError> {
        let assumptions = self.assumptions(pairs)?;
        self.solve_under(&assumptions)
    }

    fn assumptions(&self, pairs: &[Pair]) -> Result<Vec<Lit>, SearchError> {
        pairs
            .iter()
            .map(|&pair| self.space.lit(pair).ok_or(SearchError::UnknownPair(pair)))
            .collect()
    }

    fn solve_under(&mut self, assumptions: &[Lit]) -> Result<bool, SearchError> {
        self.queries += 1;
        self.solver.assume(assumptions);
        self.solver
            .solve()
            .map_err(|e| SearchError::Solver(e.to_string()))
    }
}

impl std::fmt::Debug for Feasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feasibility")
            .field("space", &self.space)
            .field("queries", &self.queries)
            .finish_non_exhaustive()
    }
}
