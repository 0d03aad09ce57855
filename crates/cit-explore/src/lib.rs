//! Search over the variant parameter space.
//!
//! - [`discover`] derives forbidden combinations from the real variants.
//! - [`coverage`] builds a covering array that respects them.
//! - [`solver`] holds the SAT encoding both sides share.

pub mod coverage;
pub mod discover;
pub mod solver;
pub mod subsets;
