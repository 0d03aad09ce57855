//! Combinations and constraints over category value positions.
//!
//! A [`Combination`] is a partial assignment `category -> value position`,
//! kept sorted by category so equal assignments hash and compare equal no
//! matter how they were built. A [`Constraint`] is a combination of at least
//! two pairs that no generated row may contain in full.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// One `category -> value position` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pair {
    pub category: usize,
    pub value: usize,
}

impl Pair {
    pub fn new(category: usize, value: usize) -> Self {
        Self { category, value }
    }

    /// Whether `row` assigns this pair's value to its category.
    pub fn matches(&self, row: &[usize]) -> bool {
        row.get(self.category) == Some(&self.value)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.category, self.value)
    }
}

/// A partial assignment in canonical (sorted, deduplicated) form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Combination {
    pairs: Vec<Pair>,
}

impl Combination {
    pub fn new(pairs: impl IntoIterator<Item = Pair>) -> Self {
        let mut pairs: Vec<Pair> = pairs.into_iter().collect();
        pairs.sort_unstable();
        pairs.dedup();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Whether the row agrees with every pair.
    pub fn satisfied_by(&self, row: &[usize]) -> bool {
        self.pairs.iter().all(|p| p.matches(row))
    }

    pub fn categories(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|p| p.category)
    }
}

impl FromIterator<Pair> for Combination {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pair}")?;
        }
        write!(f, "}}")
    }
}

/// A forbidden combination of two or more pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Combination", into = "Combination")]
pub struct Constraint(Combination);

impl Constraint {
    pub fn new(combination: Combination) -> Result<Self, ModelError> {
        if combination.len() < 2 {
            return Err(ModelError::ConstraintTooSmall(combination.len()));
        }
        Ok(Self(combination))
    }

    pub fn pairs(&self) -> &[Pair] {
        self.0.pairs()
    }

    pub fn combination(&self) -> &Combination {
        &self.0
    }

    /// Whether `row` contains every pair of the constraint.
    pub fn violated_by(&self, row: &[usize]) -> bool {
        self.0.satisfied_by(row)
    }
}

impl TryFrom<Combination> for Constraint {
    type Error = ModelError;

    fn try_from(combination: Combination) -> Result<Self, Self::Error> {
        Self::new(combination)
    }
}

impl From<Constraint> for Combination {
    fn from(constraint: Constraint) -> Self {
        constraint.0
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Deduplicated constraints in deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    constraints: BTreeSet<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the constraint was already present.
    pub fn insert(&mut self, constraint: Constraint) -> bool {
        self.constraints.insert(constraint)
    }

    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.constraints.contains(constraint)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Whether the row exhibits any forbidden combination.
    pub fn violated_by(&self, row: &[usize]) -> bool {
        self.constraints.iter().any(|c| c.violated_by(row))
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::collections::btree_set::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
