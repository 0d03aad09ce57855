//! Data model for combinatorial reduction of test variants.
//!
//! A family of test variants shares a name prefix; each variant suffix is a
//! dotted sequence of category tokens. This crate turns those names into an
//! index-based model (categories, combinations, constraints) that the search
//! crates work on, and turns generated rows back into test names.

pub mod category;
pub mod combination;
pub mod name;
pub mod variant;

pub use category::{extract_categories, Categories, CategoryDomain};
pub use combination::{Combination, Constraint, ConstraintSet, Pair};
pub use name::reassemble;
pub use variant::{decompose, Variant, VariantIndex, VariantSet, DEFAULT_ABSENT, DEFAULT_SEPARATOR};

/// Errors raised while building or querying the variant model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("no variants recorded for prefix '{0}'")]
    UnknownPrefix(String),

    #[error("prefix '{0}' has an empty variant list")]
    NoVariants(String),

    #[error("test name '{name}' does not start with prefix '{prefix}'")]
    MalformedVariant { prefix: String, name: String },

    #[error("variant '{suffix}' of '{prefix}' has a token equal to the absent value '{token}'")]
    AbsentCollision {
        prefix: String,
        suffix: String,
        token: String,
    },

    #[error("category {category} has no value '{value}'")]
    UnknownValue { category: usize, value: String },

    #[error("category {category} has no value at position {value}")]
    ValueOutOfRange { category: usize, value: usize },

    #[error("expected {expected} categories, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("a constraint needs at least two pairs, got {0}")]
    ConstraintTooSmall(usize),
}
