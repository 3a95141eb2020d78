pub mod math;
pub mod activation;
pub mod init;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optim;
pub mod data;
pub mod train;

// Convenience re-exports
pub use math::arena::{WeightArena, WeightView};
pub use activation::activation::ActivationFunction;
pub use init::initializer::Initializer;
pub use layers::dense::{Downstream, Layer};
pub use layers::neuron::Neuron;
pub use loss::mse::{ErrorData, MseLoss};
pub use network::network::Network;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use optim::sgd::Sgd;
pub use data::dataset::{DataFile, DataPoint};
pub use data::folds::FoldGroups;
pub use train::loop_fn::train_loop;
pub use train::train_config::TrainConfig;
pub use train::epoch_stats::{EpochStats, MetricsHistory};
