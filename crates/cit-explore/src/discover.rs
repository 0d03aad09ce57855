//! Constraint discovery.
//!
//! Works out which value combinations never occur together in a real
//! variant, so the covering-array search does not generate them.
//!
//! The search walks chains of pairs from the last category towards the
//! first. A chain is extended one category at a time while some real variant
//! still agrees with it. The first extension that no variant agrees with is
//! reduced to a small explaining sub-combination and recorded as a
//! constraint; that branch is not extended further.
//!
//! Reduction holds the newly added pair fixed and tries subsets of the other
//! pairs by increasing size, accepting the first subset that is already
//! invalid. That is a minimal-size explanation for this chain, not
//! necessarily the smallest constraint overall.

use cit_model::{Categories, Combination, Constraint, ConstraintSet, ModelError, Pair};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::subsets::subsets;

/// Limits for a discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum number of combinations to test. `None` = unbounded.
    #[serde(default)]
    pub max_explored: Option<u64>,
}

/// Errors during discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("constraint search tested {explored} combinations, over the limit of {limit}")]
    BudgetExhausted { explored: u64, limit: u64 },

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub constraints: ConstraintSet,
    /// Combinations tested against the real variants.
    pub explored: u64,
    /// Invalid combinations reached (before deduplication of their constraints).
    pub invalid_found: u64,
}

/// Whether some real variant row agrees with every pair.
pub fn exists(rows: &[Vec<usize>], pairs: &[Pair]) -> bool {
    rows.iter().any(|row| pairs.iter().all(|p| p.matches(row)))
}

/// Reduce an invalid chain to the constraint that explains it.
///
/// The last pair of `chain` is the one whose addition made it invalid and is
/// always part of the result.
pub fn simplify(rows: &[Vec<usize>], chain: &[Pair]) -> Result<Constraint, ModelError> {
    let Some((&fixed, others)) = chain.split_last() else {
        return Err(ModelError::ConstraintTooSmall(0));
    };

    for size in 1..=others.len() {
        for picked in subsets(others.len(), size) {
            let mut candidate: Vec<Pair> = picked.iter().map(|&i| others[i]).collect();
            candidate.push(fixed);
            if !exists(rows, &candidate) {
                return Constraint::new(Combination::new(candidate));
            }
        }
    }

    // Only reachable when the chain itself is valid.
    Constraint::new(Combination::new(chain.iter().copied()))
}

/// Depth-first constraint search over one family.
#[derive(Debug, Clone, Default)]
pub struct ConstraintDiscoverer {
    config: DiscoveryConfig,
}

impl ConstraintDiscoverer {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Discover the constraints of a family.
    ///
    /// `rows` are the family's real variants encoded against `categories`.
    /// Every call starts from an empty accumulator.
    #[tracing::instrument(skip_all, fields(arity = categories.arity(), variants = rows.len()))]
    pub fn discover(
        &self,
        categories: &Categories,
        rows: &[Vec<usize>],
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let cardinalities = categories.cardinalities();
        let mut report = DiscoveryReport::default();

        let Some(last) = cardinalities.len().checked_sub(1) else {
            return Ok(report);
        };
        if last == 0 {
            return Ok(report);
        }

        // Each entry is a chain that some variant agrees with, plus the
        // category it is extended with next.
        let mut stack: Vec<(Vec<Pair>, usize)> = (0..cardinalities[last])
            .rev()
            .map(|value| (vec![Pair::new(last, value)], last - 1))
            .collect();

        while let Some((chain, category)) = stack.pop() {
            for value in (0..cardinalities[category]).rev() {
                self.count_explored(&mut report)?;

                let mut candidate = chain.clone();
                candidate.push(Pair::new(category, value));

                if exists(rows, &candidate) {
                    if category > 0 {
                        stack.push((candidate, category - 1));
                    }
                    continue;
                }

                report.invalid_found += 1;
                let constraint = simplify(rows, &candidate)?;
                if report.constraints.contains(&constraint) {
                    continue;
                }
                debug!(
                    constraint = %describe(categories, &constraint),
                    "recorded constraint"
                );
                report.constraints.insert(constraint);
            }
        }

        info!(
            constraints = report.constraints.len(),
            explored = report.explored,
            invalid = report.invalid_found,
            "constraint discovery finished"
        );
        Ok(report)
    }

    fn count_explored(&self, report: &mut DiscoveryReport) -> Result<(), DiscoveryError> {
        report.explored += 1;
        match self.config.max_explored {
            Some(limit) if report.explored > limit => Err(DiscoveryError::BudgetExhausted {
                explored: report.explored,
                limit,
            }),
            _ => Ok(()),
        }
    }
}

fn describe(categories: &Categories, constraint: &Constraint) -> String {
    constraint
        .pairs()
        .iter()
        .map(|&p| categories.describe(p))
        .collect::<Vec<_>>()
        .join(" & ")
}
