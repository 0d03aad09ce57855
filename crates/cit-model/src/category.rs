//! Category domains.
//!
//! The domain of category `i` is the set of tokens observed at position `i`
//! across a family. Values keep first-seen order: the position of a value in
//! its domain is what constraints and covering-array rows refer to, so the
//! order must not change between runs.

use serde::{Deserialize, Serialize};

use crate::combination::Pair;
use crate::variant::{Variant, VariantSet};
use crate::ModelError;

/// Distinct values observed at one category position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDomain {
    index: usize,
    values: Vec<String>,
}

impl CategoryDomain {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            values: Vec::new(),
        }
    }

    /// Add a value unless already present; returns its position.
    pub fn observe(&mut self, value: &str) -> usize {
        match self.position(value) {
            Some(pos) => pos,
            None => {
                self.values.push(value.to_string());
                self.values.len() - 1
            }
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    pub fn value(&self, position: usize) -> Option<&str> {
        self.values.get(position).map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The parameter space of a family: one domain per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categories {
    domains: Vec<CategoryDomain>,
}

impl Categories {
    pub fn domains(&self) -> &[CategoryDomain] {
        &self.domains
    }

    pub fn domain(&self, category: usize) -> Option<&CategoryDomain> {
        self.domains.get(category)
    }

    /// Number of categories.
    pub fn arity(&self) -> usize {
        self.domains.len()
    }

    /// Domain sizes, in category order.
    pub fn cardinalities(&self) -> Vec<usize> {
        self.domains.iter().map(CategoryDomain::len).collect()
    }

    /// Translate a padded variant into value positions.
    pub fn encode(&self, variant: &Variant) -> Result<Vec<usize>, ModelError> {
        if variant.arity() != self.arity() {
            return Err(ModelError::ArityMismatch {
                expected: self.arity(),
                found: variant.arity(),
            });
        }
        self.domains
            .iter()
            .zip(variant.tokens())
            .map(|(domain, token)| {
                domain.position(token).ok_or_else(|| ModelError::UnknownValue {
                    category: domain.index,
                    value: token.clone(),
                })
            })
            .collect()
    }

    /// Encode every variant of a family.
    pub fn encode_all(&self, set: &VariantSet) -> Result<Vec<Vec<usize>>, ModelError> {
        set.variants.iter().map(|v| self.encode(v)).collect()
    }

    /// Translate a row of value positions back into tokens.
    pub fn decode(&self, row: &[usize]) -> Result<Vec<&str>, ModelError> {
        if row.len() != self.arity() {
            return Err(ModelError::ArityMismatch {
                expected: self.arity(),
                found: row.len(),
            });
        }
        self.domains
            .iter()
            .zip(row)
            .map(|(domain, &pos)| {
                domain.value(pos).ok_or(ModelError::ValueOutOfRange {
                    category: domain.index,
                    value: pos,
                })
            })
            .collect()
    }

    /// Human-readable `category=token` form of a pair, for logs.
    pub fn describe(&self, pair: Pair) -> String {
        let token = self
            .domain(pair.category)
            .and_then(|d| d.value(pair.value))
            .unwrap_or("?");
        format!("{}={:?}", pair.category, token)
    }
}

/// Collect the per-category domains of a decomposed family.
pub fn extract_categories(set: &VariantSet) -> Categories {
    let mut domains: Vec<CategoryDomain> = (0..set.arity()).map(CategoryDomain::new).collect();
    for variant in &set.variants {
        for (domain, token) in domains.iter_mut().zip(variant.tokens()) {
            domain.observe(token);
        }
    }
    Categories { domains }
}
