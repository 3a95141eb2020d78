use serde::{Deserialize, Serialize};

/// Per-example gradient descent with an optional momentum term.
///
/// Passed explicitly to every training call; a caller may swap the momentum
/// coefficient between epochs without rebuilding the network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sgd {
    pub learning_rate: f64,
    /// `0.0` disables momentum and keeps the momentum buffers zeroed.
    pub momentum: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate, momentum: 0.0 }
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum }
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Sgd::new(0.1)
    }
}
