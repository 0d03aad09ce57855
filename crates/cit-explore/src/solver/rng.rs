//! Category ordering for covering-array rows.
//!
//! The greedy generator fills the free categories of each row in a shuffled
//! order. Row `r` under seed `s` shuffles with a ChaCha8 stream seeded from
//! `s + r`, so a rerun with the same seed rebuilds the same rows while
//! consecutive rows still try categories in different orders.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// RNG for row number `row` of a run seeded with `seed`.
pub fn row_rng(seed: u64, row: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(row))
}

/// Shuffle the categories left to fill in row `row`.
pub fn shuffle_categories(seed: u64, row: u64, categories: &mut [usize]) {
    categories.shuffle(&mut row_rng(seed, row));
}
