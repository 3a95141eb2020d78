use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::dataset::DataPoint;

/// Stratified k-way split of a dataset with one fold acting as the test set.
///
/// Examples are grouped by label, each group is shuffled, and members are
/// dealt round-robin across the folds. The fold index keeps running from one
/// label group into the next, so every fold ends up within one example of an
/// even share of both the total and each class.
#[derive(Debug, Clone)]
pub struct FoldGroups {
    folds: Vec<Vec<DataPoint>>,
    test_fold: usize,
}

impl FoldGroups {
    /// # Panics
    /// Panics if `k == 0` or `k` exceeds the number of examples.
    pub fn partition(data: &[DataPoint], k: usize, seed: u64) -> FoldGroups {
        assert!(k > 0, "fold count must be at least 1");
        assert!(
            k <= data.len(),
            "cannot split {} examples into {} non-empty folds",
            data.len(),
            k
        );

        let mut by_label: BTreeMap<bool, Vec<DataPoint>> = BTreeMap::new();
        for point in data {
            by_label.entry(point.is_bad).or_default().push(point.clone());
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut folds = vec![Vec::new(); k];
        let mut next = 0;
        for (_, mut group) in by_label {
            group.shuffle(&mut rng);
            for point in group {
                folds[next].push(point);
                next = (next + 1) % k;
            }
        }

        FoldGroups { folds, test_fold: 0 }
    }

    pub fn k(&self) -> usize {
        self.folds.len()
    }

    pub fn folds(&self) -> &[Vec<DataPoint>] {
        &self.folds
    }

    pub fn test_fold(&self) -> usize {
        self.test_fold
    }

    /// # Panics
    /// Panics if `index >= k`.
    pub fn set_test_fold(&mut self, index: usize) {
        assert!(index < self.folds.len(), "fold {} out of range (k = {})", index, self.folds.len());
        self.test_fold = index;
    }

    /// Moves the test role to the next fold, wrapping around.
    pub fn rotate(&mut self) -> usize {
        self.test_fold = (self.test_fold + 1) % self.folds.len();
        self.test_fold
    }

    pub fn test(&self) -> &[DataPoint] {
        &self.folds[self.test_fold]
    }

    /// Union of every fold except the test fold. With `k == 1` the single
    /// fold is both the training and the test set.
    pub fn train(&self) -> Vec<DataPoint> {
        if self.folds.len() == 1 {
            return self.folds[0].clone();
        }
        self.folds.iter()
            .enumerate()
            .filter(|(i, _)| *i != self.test_fold)
            .flat_map(|(_, fold)| fold.iter().cloned())
            .collect()
    }
}
