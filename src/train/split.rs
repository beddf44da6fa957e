//! Seeded data splitting for training and cross-validation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `0..n_rows` with a seeded RNG and cut off the last `test_size`
/// fraction as the test set. Returns `(train_indices, test_indices)`.
///
/// The test set always holds at least one row when `n_rows >= 2`.
pub fn train_test_split(n_rows: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_rows as f64 * test_size).round() as usize)
        .clamp(usize::from(n_rows >= 2), n_rows.saturating_sub(1));
    let test = indices.split_off(n_rows - n_test);
    (indices, test)
}

/// Contiguous k-fold splitter over a pre-shuffled index slice.
#[derive(Clone, Copy, Debug)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Yield `(train, validation)` index pairs, one per fold. The first
    /// `len % n_splits` folds take one extra row, matching the usual
    /// contiguous-fold convention. Requires `indices.len() >= n_splits`.
    pub fn split<'a>(
        &self,
        indices: &'a [usize],
    ) -> impl Iterator<Item = (Vec<usize>, Vec<usize>)> + 'a {
        let n = indices.len();
        let n_splits = self.n_splits;
        let base = n / n_splits;
        let extra = n % n_splits;

        (0..n_splits).map(move |fold| {
            let start = fold * base + fold.min(extra);
            let end = start + base + usize::from(fold < extra);
            let validation = indices[start..end].to_vec();
            let train = indices[..start]
                .iter()
                .chain(&indices[end..])
                .copied()
                .collect();
            (train, validation)
        })
    }
}
