use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`              - total number of full passes over the training folds
/// - `repeats_per_example` - consecutive training steps taken on each example
/// - `rotate_every`        - move the test role to the next fold every this
///                           many epochs; `0` keeps the test fold fixed
/// - `progress_tx`         - optional channel sender; one `EpochStats` is sent per
///                           completed epoch.  If the receiver is dropped the loop
///                           terminates early (clean shutdown).
/// - `stop_flag`           - optional atomic flag; when set to `true` from another
///                           thread the loop terminates after the current epoch.
pub struct TrainConfig {
    pub epochs: usize,
    pub repeats_per_example: usize,
    pub rotate_every: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig`: one step per example, fixed test fold,
    /// no progress channel and no stop flag.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            repeats_per_example: 1,
            rotate_every: 0,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
