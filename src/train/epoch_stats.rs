use serde::{Serialize, Deserialize};

/// Per-epoch training statistics.
///
/// Emitted once per completed epoch by `train_loop` and `TrainingWorker`
/// (through `progress_tx` when one is configured) and collected into a
/// `MetricsHistory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested; `None` for open-ended background training.
    pub total_epochs: Option<usize>,
    /// Fold that played the test role during this epoch.
    pub test_fold: usize,
    /// Mean error over every training step of the epoch.
    pub train_error: f64,
    pub train_d_error: f64,
    /// Mean error over the test fold after the epoch's updates.
    pub test_error: f64,
    pub test_d_error: f64,
    /// Fraction of the training set classified correctly, in [0, 1].
    pub correct_train: f64,
    /// Fraction of the test fold classified correctly, in [0, 1].
    pub correct_test: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Named time series of every metric, indexed by epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsHistory {
    pub train_error: Vec<f64>,
    pub train_d_error: Vec<f64>,
    pub test_error: Vec<f64>,
    pub test_d_error: Vec<f64>,
    pub correct_train: Vec<f64>,
    pub correct_test: Vec<f64>,
}

impl MetricsHistory {
    pub fn push(&mut self, stats: &EpochStats) {
        self.train_error.push(stats.train_error);
        self.train_d_error.push(stats.train_d_error);
        self.test_error.push(stats.test_error);
        self.test_d_error.push(stats.test_d_error);
        self.correct_train.push(stats.correct_train);
        self.correct_test.push(stats.correct_test);
    }

    pub fn len(&self) -> usize {
        self.train_error.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train_error.is_empty()
    }

    /// Series in CSV column order.
    pub fn series(&self) -> Vec<(String, Vec<f64>)> {
        vec![
            ("train_error".to_string(), self.train_error.clone()),
            ("train_d_error".to_string(), self.train_d_error.clone()),
            ("test_error".to_string(), self.test_error.clone()),
            ("test_d_error".to_string(), self.test_d_error.clone()),
            ("correct_train".to_string(), self.correct_train.clone()),
            ("correct_test".to_string(), self.correct_test.clone()),
        ]
    }
}
