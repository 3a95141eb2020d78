use std::sync::atomic::Ordering;
use std::time::Instant;

use log::debug;

use crate::data::folds::FoldGroups;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::{EpochStats, MetricsHistory};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs on the non-test folds of
/// `folds`, evaluating on the test fold after every epoch, and returns the
/// recorded metrics.
///
/// When `config.rotate_every > 0` the test role moves to the next fold after
/// every `rotate_every` epochs.
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Panics
/// Panics if `config.repeats_per_example == 0`.
pub fn train_loop(
    network: &mut Network,
    folds: &mut FoldGroups,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> MetricsHistory {
    let mut history = MetricsHistory::default();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            debug!("stop requested before epoch {}", epoch);
            break;
        }

        let stats = run_epoch(
            network,
            folds,
            optimizer,
            config.repeats_per_example,
            epoch,
            Some(config.epochs),
        );
        history.push(&stats);

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                debug!("progress receiver dropped; stopping after epoch {}", epoch);
                break;
            }
        }

        if config.rotate_every > 0 && epoch % config.rotate_every == 0 {
            let next = folds.rotate();
            debug!("test fold rotated to {}", next);
        }
    }

    history
}

/// One epoch: train on the non-test folds, then measure both sets.
pub fn run_epoch(
    network: &mut Network,
    folds: &FoldGroups,
    optimizer: &Sgd,
    repeats_per_example: usize,
    epoch: usize,
    total_epochs: Option<usize>,
) -> EpochStats {
    let t_start = Instant::now();

    let train = folds.train();
    let train_error = network.train_epoch(&train, optimizer, repeats_per_example);
    let test_error = network.error(folds.test());
    let correct_train = network.correct(&train);
    let correct_test = network.correct(folds.test());

    let stats = EpochStats {
        epoch,
        total_epochs,
        test_fold: folds.test_fold(),
        train_error: train_error.error,
        train_d_error: train_error.d_error,
        test_error: test_error.error,
        test_d_error: test_error.d_error,
        correct_train,
        correct_test,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    };

    debug!(
        "epoch {}: train {:.6} (d {:.6}, {:.1}% correct), test {:.6} (d {:.6}, {:.1}% correct)",
        epoch,
        stats.train_error,
        stats.train_d_error,
        stats.correct_train * 100.0,
        stats.test_error,
        stats.test_d_error,
        stats.correct_test * 100.0
    );

    stats
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    use crate::activation::activation::ActivationFunction;
    use crate::data::dataset::DataPoint;
    use crate::network::spec::NetworkSpec;

    fn data() -> Vec<DataPoint> {
        (0..6).map(|i| DataPoint::new(false, vec![1.0, 0.1 * i as f64]).normalize())
            .chain((0..6).map(|i| DataPoint::new(true, vec![0.1 * i as f64, 1.0]).normalize()))
            .collect()
    }

    fn network() -> Network {
        Network::from_spec(&NetworkSpec::stacked(2, 0, 0, 2, ActivationFunction::Sigmoid).with_seed(1))
    }

    #[test_log::test]
    fn records_one_entry_per_epoch() {
        let mut net = network();
        let mut folds = FoldGroups::partition(&data(), 3, 5);
        let history = train_loop(&mut net, &mut folds, &Sgd::new(0.5), &TrainConfig::new(4));
        assert_eq!(history.len(), 4);
        assert!(history.test_error.iter().all(|e| *e >= 0.0));
        assert!(history.correct_test.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test_log::test]
    fn rotates_test_fold_on_schedule() {
        let mut net = network();
        let mut folds = FoldGroups::partition(&data(), 3, 5);
        let (tx, rx) = mpsc::channel();
        let mut config = TrainConfig::new(5);
        config.rotate_every = 2;
        config.progress_tx = Some(tx);

        train_loop(&mut net, &mut folds, &Sgd::new(0.5), &config);
        drop(config);

        let used: Vec<usize> = rx.iter().map(|s| s.test_fold).collect();
        assert_eq!(used, vec![0, 0, 1, 1, 2]);
        assert_eq!(folds.test_fold(), 2);
    }

    #[test_log::test]
    fn stop_flag_prevents_further_epochs() {
        let mut net = network();
        let mut folds = FoldGroups::partition(&data(), 2, 5);
        let mut config = TrainConfig::new(10);
        config.stop_flag = Some(Arc::new(AtomicBool::new(true)));

        let history = train_loop(&mut net, &mut folds, &Sgd::new(0.5), &config);
        assert!(history.is_empty());
    }

    #[test_log::test]
    fn dropped_receiver_ends_training() {
        let mut net = network();
        let mut folds = FoldGroups::partition(&data(), 2, 5);
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut config = TrainConfig::new(10);
        config.progress_tx = Some(tx);

        let history = train_loop(&mut net, &mut folds, &Sgd::new(0.5), &config);
        assert_eq!(history.len(), 1);
    }
}
