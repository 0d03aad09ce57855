//! The reduction pipeline.
//!
//! 1. Decompose the family's variant names into padded token rows.
//! 2. Extract per-category domains.
//! 3. Discover the combinations real variants never exhibit.
//! 4. Build a covering array that avoids them.
//! 5. Turn rows back into test names.
//! 6. Accept the list only if every name is a real test.

use std::collections::{BTreeSet, HashSet};

use cit_explore::coverage::{
    CoverageError, CoveringArray, CoveringArrayGenerator, CoveringProblem, GreedyGenerator,
};
use cit_explore::discover::{ConstraintDiscoverer, DiscoveryError};
use cit_model::{
    decompose, extract_categories, reassemble, Categories, ConstraintSet, ModelError,
    VariantIndex,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ConfigError, ReductionConfig};

#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("constraint discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("covering array generation failed: {0}")]
    Coverage(#[from] CoverageError),
}

/// Whether the reduced list can be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every generated name is a real test.
    Reduced { names: Vec<String> },
    /// Some generated names are not real tests; no list is produced.
    Spurious { spurious: Vec<String> },
    /// The generator returned no rows.
    Empty,
}

/// Everything a reduction run computed.
#[derive(Debug, Clone, Serialize)]
pub struct Reduction {
    pub prefix: String,
    pub categories: Categories,
    pub constraints: ConstraintSet,
    pub array: CoveringArray,
    pub outcome: Outcome,
}

impl Reduction {
    /// The reduced test list, if the run produced a valid one.
    pub fn test_names(&self) -> Option<&[String]> {
        match &self.outcome {
            Outcome::Reduced { names } => Some(names),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, Outcome::Reduced { .. })
    }
}

/// Reduce the family `prefix` with the default greedy generator.
pub fn reduce(
    index: &VariantIndex,
    prefix: &str,
    config: &ReductionConfig,
) -> Result<Reduction, ReduceError> {
    reduce_with(index, prefix, config, &GreedyGenerator::new(config.seed))
}

/// Reduce the family `prefix` with a caller-supplied covering-array generator.
#[tracing::instrument(skip(index, config, generator), fields(strength = config.strength))]
pub fn reduce_with<G>(
    index: &VariantIndex,
    prefix: &str,
    config: &ReductionConfig,
    generator: &G,
) -> Result<Reduction, ReduceError>
where
    G: CoveringArrayGenerator + ?Sized,
{
    config.validate()?;

    let set = decompose(index, prefix, config.separator, &config.absent)?;
    let categories = extract_categories(&set);
    let rows = categories.encode_all(&set)?;
    info!(
        variants = set.len(),
        categories = categories.arity(),
        "decomposed family"
    );

    let report = ConstraintDiscoverer::new(config.discovery()).discover(&categories, &rows)?;

    let cardinalities = categories.cardinalities();
    let array = generator.generate(&CoveringProblem {
        cardinalities: &cardinalities,
        strength: config.strength,
        forbidden: &report.constraints,
    })?;

    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(array.rows.len());
    for row in &array.rows {
        let tokens = categories.decode(row)?;
        let name = reassemble(prefix, tokens, config.separator, &config.absent);
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    let outcome = validate(names, &index.full_names(config.separator));
    match &outcome {
        Outcome::Reduced { names } => info!(
            selected = names.len(),
            total = set.len(),
            "reduction succeeded"
        ),
        Outcome::Spurious { spurious } => warn!(
            spurious = spurious.len(),
            first = %spurious[0],
            "reduction produced names that are not real tests"
        ),
        Outcome::Empty => warn!("covering array generator returned no rows"),
    }

    Ok(Reduction {
        prefix: prefix.to_string(),
        categories,
        constraints: report.constraints,
        array,
        outcome,
    })
}

/// All-or-nothing check of generated names against the observed ones.
pub fn validate(names: Vec<String>, known: &BTreeSet<String>) -> Outcome {
    if names.is_empty() {
        return Outcome::Empty;
    }
    let spurious: Vec<String> = names
        .iter()
        .filter(|name| !known.contains(*name))
        .cloned()
        .collect();
    if spurious.is_empty() {
        Outcome::Reduced { names }
    } else {
        Outcome::Spurious { spurious }
    }
}
