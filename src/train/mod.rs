pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;
pub mod worker;

pub use epoch_stats::{EpochStats, MetricsHistory};
pub use train_config::TrainConfig;
pub use loop_fn::{run_epoch, train_loop};
pub use worker::{SharedSession, TrainingSession, TrainingWorker};
