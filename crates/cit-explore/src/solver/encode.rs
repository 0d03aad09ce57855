//! SAT encoding of the category space.
//!
//! Encoding strategy:
//! - Each category is one-hot: one SAT variable per value position, with an
//!   exactly-one constraint (at-least-one + pairwise at-most-one).
//! - Each forbidden combination becomes a single clause: at least one of its
//!   pairs must be false.

use cit_model::{Constraint, ConstraintSet, Pair};
use varisat::{Lit, Var};

/// A set of CNF clauses. Each inner Vec<Lit> is a disjunction; the set is a conjunction.
pub type CnfClauses = Vec<Vec<Lit>>;

/// Errors during encoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("category {0} has an empty domain")]
    EmptyCategory(usize),

    #[error("constraint {constraint} refers to {pair}, outside the parameter space")]
    OutOfSpace { constraint: Constraint, pair: Pair },
}

/// Categories mapped to SAT variables, plus all clauses of the space.
#[derive(Debug, Clone)]
pub struct EncodedSpace {
    cardinalities: Vec<usize>,
    /// First variable index of each category.
    offsets: Vec<usize>,
    /// Exactly-one clauses for every category.
    pub structural_clauses: CnfClauses,
    /// One blocking clause per forbidden combination.
    pub constraint_clauses: CnfClauses,
}

impl EncodedSpace {
    /// Encode categories of the given sizes and the combinations they may not take.
    pub fn encode(cardinalities: &[usize], forbidden: &ConstraintSet) -> Result<Self, EncodingError> {
        let mut offsets = Vec::with_capacity(cardinalities.len());
        let mut structural_clauses = Vec::new();
        let mut next_var = 0usize;

        for (category, &size) in cardinalities.iter().enumerate() {
            if size == 0 {
                return Err(EncodingError::EmptyCategory(category));
            }
            offsets.push(next_var);
            let vars: Vec<Var> = (next_var..next_var + size).map(Var::from_index).collect();
            next_var += size;

            structural_clauses.push(vars.iter().map(|v| v.positive()).collect());
            for i in 0..vars.len() {
                for j in (i + 1)..vars.len() {
                    structural_clauses.push(vec![vars[i].negative(), vars[j].negative()]);
                }
            }
        }

        let mut space = Self {
            cardinalities: cardinalities.to_vec(),
            offsets,
            structural_clauses,
            constraint_clauses: Vec::with_capacity(forbidden.len()),
        };

        for constraint in forbidden {
            let clause = constraint
                .pairs()
                .iter()
                .map(|&pair| {
                    space.lit(pair).map(|l| !l).ok_or_else(|| EncodingError::OutOfSpace {
                        constraint: constraint.clone(),
                        pair,
                    })
                })
                .collect::<Result<Vec<Lit>, _>>()?;
            space.constraint_clauses.push(clause);
        }

        Ok(space)
    }

    /// The variable standing for `pair`, if the pair lies inside the space.
    pub fn var(&self, pair: Pair) -> Option<Var> {
        let size = *self.cardinalities.get(pair.category)?;
        (pair.value < size).then(|| Var::from_index(self.offsets[pair.category] + pair.value))
    }

    /// Positive literal asserting `pair`.
    pub fn lit(&self, pair: Pair) -> Option<Lit> {
        self.var(pair).map(|v| v.positive())
    }

    /// All clauses: structural first, then constraints.
    pub fn clauses(&self) -> impl Iterator<Item = &[Lit]> {
        self.structural_clauses
            .iter()
            .chain(&self.constraint_clauses)
            .map(Vec::as_slice)
    }
}
