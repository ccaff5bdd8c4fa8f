//! Sequence similarity between token streams.

use similar::{capture_diff_slices, Algorithm, DiffOp};
use std::cmp::Ordering;

/// `2 * M / T` where `M` is the number of tokens the two streams keep in
/// common (their longest common subsequence) and `T` the total number of
/// tokens. 1.0 for identical streams.
pub fn similarity_ratio(a: &[&str], b: &[&str]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * common_tokens(a, b) as f64 / total as f64
}

fn common_tokens(a: &[&str], b: &[&str]) -> usize {
    capture_diff_slices(Algorithm::Myers, a, b)
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum()
}

/// Best ratio two streams of these lengths could reach.
pub fn length_bound(len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 1.0;
    }
    2.0 * len_a.min(len_b) as f64 / total as f64
}

/// Cheap upper bound on [`similarity_ratio`]: the common subsequence can be
/// no longer than the shorter stream nor than the multiset intersection.
pub fn ratio_upper_bound(a: &[&str], b: &[&str]) -> f64 {
    TokenBag::new(a).upper_bound(&TokenBag::new(b))
}

/// Sorted tokens of one stream, built once and checked against many others.
#[derive(Clone, Debug)]
pub struct TokenBag<'a> {
    sorted: Vec<&'a str>,
}

impl<'a> TokenBag<'a> {
    pub fn new(tokens: &[&'a str]) -> Self {
        let mut sorted = tokens.to_vec();
        sorted.sort_unstable();
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Size of the multiset intersection.
    pub fn overlap(&self, other: &TokenBag<'_>) -> usize {
        let (left, right) = (&self.sorted, &other.sorted);
        let (mut i, mut j, mut shared) = (0, 0, 0);
        while i < left.len() && j < right.len() {
            match left[i].cmp(right[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    shared += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        shared
    }

    pub fn upper_bound(&self, other: &TokenBag<'_>) -> f64 {
        let total = self.len() + other.len();
        if total == 0 {
            return 1.0;
        }
        let shared = self.overlap(other).min(self.len().min(other.len()));
        2.0 * shared as f64 / total as f64
    }
}
