//! Covering-array generation.
//!
//! A covering array of strength `t` is a set of full rows such that every
//! combination of values across any `t` categories appears in some row. Here
//! the rows must also respect a set of forbidden combinations, so
//! interactions that no valid row can contain are excluded from the target
//! set instead of failing the run.
//!
//! [`CoveringArrayGenerator`] is the pluggable primitive; [`GreedyGenerator`]
//! is the default implementation.

use std::collections::BTreeSet;

use cit_model::{Combination, ConstraintSet, Pair};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::solver::rng::shuffle_categories;
use crate::solver::{EncodedSpace, EncodingError, Feasibility, SearchError};
use crate::subsets::subsets;

/// A full assignment: one value position per category.
pub type Row = Vec<usize>;

/// Default interaction strength.
pub const DEFAULT_STRENGTH: usize = 3;

/// Input of a covering-array computation.
#[derive(Debug, Clone, Copy)]
pub struct CoveringProblem<'a> {
    /// Number of values of each category.
    pub cardinalities: &'a [usize],
    /// Interaction strength `t`. Clamped to the number of categories.
    pub strength: usize,
    /// Combinations no row may contain.
    pub forbidden: &'a ConstraintSet,
}

impl CoveringProblem<'_> {
    /// Strength actually used: `t` cannot exceed the number of categories.
    pub fn effective_strength(&self) -> usize {
        self.strength.min(self.cardinalities.len())
    }
}

/// Generated rows plus what they were required to cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveringArray {
    pub rows: Vec<Row>,
    /// Effective interaction strength.
    pub strength: usize,
    /// Feasible interactions the rows cover.
    pub total_targets: usize,
    /// Interactions no valid row can contain.
    pub excluded: BTreeSet<Combination>,
}

/// Errors during covering-array generation.
#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    #[error("interaction strength must be at least 1")]
    InvalidStrength,

    #[error("the constraints admit no row at all")]
    Unsatisfiable,

    #[error("no valid row could be built for feasible interaction {0}")]
    Unplaceable(Combination),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Computes covering arrays under constraints.
pub trait CoveringArrayGenerator {
    fn generate(&self, problem: &CoveringProblem<'_>) -> Result<CoveringArray, CoverageError>;
}

/// All `strength`-wise interactions over categories of the given sizes.
///
/// Category subsets come in lexicographic order, and value tuples within a
/// subset in odometer order (last category fastest).
pub fn interactions(cardinalities: &[usize], strength: usize) -> Vec<Combination> {
    let mut out = Vec::new();
    for categories in subsets(cardinalities.len(), strength) {
        let mut values = vec![0usize; categories.len()];
        loop {
            out.push(
                categories
                    .iter()
                    .zip(&values)
                    .map(|(&c, &v)| Pair::new(c, v))
                    .collect(),
            );

            // Odometer step; stop once every digit has wrapped.
            let mut digit = categories.len();
            loop {
                if digit == 0 {
                    break;
                }
                digit -= 1;
                values[digit] += 1;
                if values[digit] < cardinalities[categories[digit]] {
                    break;
                }
                values[digit] = 0;
            }
            if values.iter().all(|&v| v == 0) {
                break;
            }
        }
    }
    out
}

/// Which of `targets` the rows cover.
pub fn check_coverage(rows: &[Row], targets: &[Combination]) -> BTreeSet<Combination> {
    targets
        .iter()
        .filter(|t| rows.iter().any(|row| t.satisfied_by(row)))
        .cloned()
        .collect()
}

/// One-row-at-a-time greedy construction.
///
/// Each row starts from the first still-uncovered interaction. The remaining
/// categories are visited in a seeded random order, and each takes the value
/// that completes the most uncovered interactions while the partial row stays
/// extendable to a valid full row. Ties go to the lowest value position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreedyGenerator {
    pub seed: u64,
}

impl GreedyGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl CoveringArrayGenerator for GreedyGenerator {
    #[tracing::instrument(skip_all, fields(
        categories = problem.cardinalities.len(),
        strength = problem.strength,
        forbidden = problem.forbidden.len()
    ))]
    fn generate(&self, problem: &CoveringProblem<'_>) -> Result<CoveringArray, CoverageError> {
        if problem.strength == 0 {
            return Err(CoverageError::InvalidStrength);
        }
        let cardinalities = problem.cardinalities;
        let arity = cardinalities.len();
        let strength = problem.effective_strength();

        let space = EncodedSpace::encode(cardinalities, problem.forbidden)?;
        let mut oracle = Feasibility::new(space);
        if !oracle.is_feasible(&[])? {
            return Err(CoverageError::Unsatisfiable);
        }

        let mut uncovered = BTreeSet::new();
        let mut excluded = BTreeSet::new();
        if arity > 0 {
            for interaction in interactions(cardinalities, strength) {
                if oracle.is_feasible(interaction.pairs())? {
                    uncovered.insert(interaction);
                } else {
                    excluded.insert(interaction);
                }
            }
        }
        let total_targets = uncovered.len();
        debug!(targets = total_targets, excluded = excluded.len(), "interaction targets");

        let mut rows: Vec<Row> = Vec::new();
        while let Some(start) = uncovered.first().cloned() {
            let mut assigned: Vec<Pair> = start.pairs().to_vec();
            let mut free: Vec<usize> = (0..arity)
                .filter(|c| !start.categories().any(|s| s == *c))
                .collect();
            shuffle_categories(self.seed, rows.len() as u64, &mut free);

            for category in free {
                let mut best: Option<(usize, usize)> = None;
                for value in 0..cardinalities[category] {
                    assigned.push(Pair::new(category, value));
                    if oracle.is_feasible(&assigned)? {
                        let gain = gain(&uncovered, &assigned, category);
                        if best.map_or(true, |(g, _)| gain > g) {
                            best = Some((gain, value));
                        }
                    }
                    assigned.pop();
                }
                let (_, value) = best.ok_or_else(|| CoverageError::Unplaceable(start.clone()))?;
                assigned.push(Pair::new(category, value));
            }

            let row = to_row(arity, &assigned);
            let before = uncovered.len();
            uncovered.retain(|t| !t.satisfied_by(&row));
            debug!(row = ?row, covered = before - uncovered.len(), "row added");
            rows.push(row);
        }

        info!(
            rows = rows.len(),
            targets = total_targets,
            excluded = excluded.len(),
            queries = oracle.queries(),
            "covering array generated"
        );
        Ok(CoveringArray {
            rows,
            strength,
            total_targets,
            excluded,
        })
    }
}

/// Uncovered interactions that `assigned` completes through `category`.
fn gain(uncovered: &BTreeSet<Combination>, assigned: &[Pair], category: usize) -> usize {
    uncovered
        .iter()
        .filter(|t| t.categories().any(|c| c == category))
        .filter(|t| t.pairs().iter().all(|p| assigned.contains(p)))
        .count()
}

fn to_row(arity: usize, assigned: &[Pair]) -> Row {
    let mut row = vec![0; arity];
    for pair in assigned {
        row[pair.category] = pair.value;
    }
    row
}
