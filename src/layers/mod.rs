pub mod dense;
pub mod neuron;

pub use dense::{Downstream, Layer};
pub use neuron::Neuron;
