//! Fixed-size subsets of `0..n` in lexicographic order.

/// Iterator over all `k`-element subsets of `0..n`, as sorted index vectors.
///
/// `k == 0` yields the empty subset once; `k > n` yields nothing.
#[derive(Debug, Clone)]
pub struct Subsets {
    n: usize,
    current: Option<Vec<usize>>,
}

pub fn subsets(n: usize, k: usize) -> Subsets {
    Subsets {
        n,
        current: (k <= n).then(|| (0..k).collect()),
    }
}

impl Iterator for Subsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let k = current.len();

        // Advance: find the rightmost slot that can still move right.
        let mut next = current.clone();
        let pivot = (0..k).rev().find(|&i| next[i] < self.n - k + i);
        if let Some(i) = pivot {
            next[i] += 1;
            for j in (i + 1)..k {
                next[j] = next[j - 1] + 1;
            }
            self.current = Some(next);
        }

        Some(current)
    }
}
