use serde::{Serialize, Deserialize};
use std::f64::consts::E;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    ReLU,
    /// Step at zero. Its derivative is defined as flat everywhere.
    Threshold,
    /// Passes values above 0.5 through and reflects everything else.
    Bulu,
    Identity,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::Threshold => if x >= 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Bulu => if x > 0.5 { x } else { -x },
            ActivationFunction::Identity => x,
        }
    }

    /// Derivative evaluated at the pre-activation value `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = self.function(x);
                1.0 - t * t
            }
            ActivationFunction::ReLU => if x >= 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Threshold => 0.0,
            ActivationFunction::Bulu => if x >= 0.0 { 1.0 } else { -1.0 },
            ActivationFunction::Identity => 1.0,
        }
    }
}
