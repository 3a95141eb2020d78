pub mod network;
pub mod spec;

pub use network::{predicts_bad, Network};
pub use spec::{NetworkSpec, LayerSpec};
