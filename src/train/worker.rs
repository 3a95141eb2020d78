use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};

use crate::data::folds::FoldGroups;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::loop_fn::run_epoch;

/// Everything a background trainer reads and mutates between ticks.
pub struct TrainingSession {
    pub network: Network,
    pub folds: FoldGroups,
    pub optimizer: Sgd,
    pub repeats_per_example: usize,
    /// Epochs completed so far.
    pub epoch: usize,
}

impl TrainingSession {
    pub fn new(network: Network, folds: FoldGroups, optimizer: Sgd) -> TrainingSession {
        TrainingSession {
            network,
            folds,
            optimizer,
            repeats_per_example: 1,
            epoch: 0,
        }
    }

    /// Runs the next epoch against the current fold split.
    pub fn run_epoch(&mut self) -> EpochStats {
        self.epoch += 1;
        run_epoch(
            &mut self.network,
            &self.folds,
            &self.optimizer,
            self.repeats_per_example,
            self.epoch,
            None,
        )
    }
}

pub type SharedSession = Arc<Mutex<TrainingSession>>;

/// Drives one epoch per tick on a background thread.
///
/// The session is the only state shared with the caller and every access
/// goes through its mutex. In pause mode the thread idles until `step` is
/// called, then runs exactly one epoch. `stop` (or dropping the worker)
/// raises the stop flag and joins the thread.
pub struct TrainingWorker {
    session: SharedSession,
    stop_flag: Arc<AtomicBool>,
    pause_mode: Arc<AtomicBool>,
    step_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

const IDLE_POLL: Duration = Duration::from_millis(1);

impl TrainingWorker {
    pub fn spawn(session: SharedSession, progress_tx: mpsc::Sender<EpochStats>, paused: bool) -> TrainingWorker {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let pause_mode = Arc::new(AtomicBool::new(paused));
        let step_flag = Arc::new(AtomicBool::new(false));

        let handle = {
            let session = session.clone();
            let stop_flag = stop_flag.clone();
            let pause_mode = pause_mode.clone();
            let step_flag = step_flag.clone();
            thread::spawn(move || {
                info!("training worker started (paused: {})", pause_mode.load(Ordering::Relaxed));
                while !stop_flag.load(Ordering::Relaxed) {
                    if pause_mode.load(Ordering::Relaxed) && !step_flag.swap(false, Ordering::Relaxed) {
                        thread::sleep(IDLE_POLL);
                        continue;
                    }

                    let stats = match session.lock() {
                        Ok(mut guard) => guard.run_epoch(),
                        Err(_) => {
                            error!("training session lock poisoned; worker exiting");
                            break;
                        }
                    };

                    if progress_tx.send(stats).is_err() {
                        debug!("progress receiver dropped; worker exiting");
                        break;
                    }
                }
                info!("training worker stopped");
            })
        };

        TrainingWorker {
            session,
            stop_flag,
            pause_mode,
            step_flag,
            handle: Some(handle),
        }
    }

    /// Locks the session for a read-modify-write from the caller's side.
    pub fn lock(&self) -> MutexGuard<'_, TrainingSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_paused(&self, paused: bool) {
        self.pause_mode.store(paused, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.pause_mode.load(Ordering::Relaxed)
    }

    /// Lets a paused worker run one epoch.
    pub fn step(&self) {
        self.step_flag.store(true, Ordering::Relaxed);
    }

    /// Hands the test role to the next fold; takes effect from the next epoch.
    pub fn swap_fold(&self) -> usize {
        let fold = self.lock().folds.rotate();
        debug!("test fold swapped to {}", fold);
        fold
    }

    /// Stops the thread after its current epoch and waits for it.
    pub fn stop(mut self) -> thread::Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> thread::Result<()> {
        self.stop_flag.store(true, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl Drop for TrainingWorker {
    fn drop(&mut self) {
        if self.shutdown().is_err() {
            error!("training worker panicked");
        }
    }
}
