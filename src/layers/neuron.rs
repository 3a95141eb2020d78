use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::math::arena::{WeightArena, WeightView};

/// One output unit of a layer.
///
/// The neuron owns its bias; its weights, weight gradients and momentum live
/// in the layer's arenas and are reached through views of identical length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neuron {
    bias: f64,
    bias_gradient: f64,
    weights: WeightView,
    gradients: WeightView,
    momentum: WeightView,
    // scratch, rewritten on every forward/backward pass
    #[serde(skip)]
    z: f64,
    #[serde(skip)]
    a: f64,
    #[serde(skip)]
    error: f64,
}

impl Neuron {
    pub fn new(bias: f64, weights: WeightView, gradients: WeightView, momentum: WeightView) -> Neuron {
        assert!(
            weights.len() == gradients.len() && weights.len() == momentum.len(),
            "weight, gradient and momentum views must have equal length"
        );
        Neuron {
            bias,
            bias_gradient: 0.0,
            weights,
            gradients,
            momentum,
            z: 0.0,
            a: 0.0,
            error: 0.0,
        }
    }

    /// z = bias + Σ inputs[i]·w[i]; a = f(z). Returns `a`.
    pub fn activate(&mut self, inputs: &[f64], weights: &WeightArena, activation: ActivationFunction) -> f64 {
        let w = weights.view(self.weights);
        assert_eq!(
            inputs.len(),
            w.len(),
            "input length {} does not match weight count {}",
            inputs.len(),
            w.len()
        );
        self.z = self.bias + inputs.iter().zip(w).map(|(x, w)| x * w).sum::<f64>();
        self.a = activation.function(self.z);
        self.a
    }

    /// Computes the local error and stores descent steps for the bias and
    /// every incoming weight. Nothing is applied until `update`.
    pub fn back_prop(
        &mut self,
        activation: ActivationFunction,
        previous_outputs: &[f64],
        upstream_error: f64,
        learning_rate: f64,
        gradients: &mut WeightArena,
    ) {
        self.error = activation.derivative(self.z) * upstream_error;
        self.bias_gradient = -learning_rate * self.error;

        let dw = gradients.view_mut(self.gradients);
        assert_eq!(
            previous_outputs.len(),
            dw.len(),
            "previous layer output length {} does not match weight count {}",
            previous_outputs.len(),
            dw.len()
        );
        for (g, &prev) in dw.iter_mut().zip(previous_outputs) {
            *g = -learning_rate * prev * self.error;
        }
    }

    /// Applies the stored steps. Momentum is cleared instead of accumulated
    /// when `reset_momentum` is set or the coefficient is zero.
    pub fn update(
        &mut self,
        momentum_coefficient: f64,
        reset_momentum: bool,
        weights: &mut WeightArena,
        gradients: &WeightArena,
        momentum: &mut WeightArena,
    ) {
        let dw = gradients.view(self.gradients);
        if reset_momentum || momentum_coefficient == 0.0 {
            momentum.clear(self.momentum);
        } else {
            for (m, g) in momentum.view_mut(self.momentum).iter_mut().zip(dw) {
                *m += momentum_coefficient * g;
            }
        }

        let mom = momentum.view(self.momentum);
        for ((w, &m), &g) in weights.view_mut(self.weights).iter_mut().zip(mom).zip(dw) {
            *w += m + g;
        }
        self.bias += self.bias_gradient;
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn bias_gradient(&self) -> f64 {
        self.bias_gradient
    }

    /// Pre-activation sum from the last forward pass.
    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn output(&self) -> f64 {
        self.a
    }

    /// Local error from the last backward pass.
    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn weights(&self) -> WeightView {
        self.weights
    }

    pub fn gradients(&self) -> WeightView {
        self.gradients
    }

    pub fn momentum(&self) -> WeightView {
        self.momentum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        neuron: Neuron,
        weights: WeightArena,
        gradients: WeightArena,
        momentum: WeightArena,
    }

    fn fixture(w: &[f64], bias: f64) -> Fixture {
        let mut weights = WeightArena::preallocate(w.len());
        let mut gradients = WeightArena::preallocate(w.len());
        let mut momentum = WeightArena::preallocate(w.len());
        let neuron = Neuron::new(
            bias,
            weights.allocate_view(w.len()),
            gradients.allocate_view(w.len()),
            momentum.allocate_view(w.len()),
        );
        weights.seal();
        gradients.seal();
        momentum.seal();
        weights.view_mut(neuron.weights()).copy_from_slice(w);
        Fixture { neuron, weights, gradients, momentum }
    }

    #[test_log::test]
    fn activate_computes_weighted_sum_plus_bias() {
        let mut f = fixture(&[0.5, -1.0], 0.25);
        let a = f.neuron.activate(&[2.0, 1.0], &f.weights, ActivationFunction::Identity);
        assert_eq!(f.neuron.z(), 0.25 + 1.0 - 1.0);
        assert_eq!(a, 0.25);
    }

    #[test_log::test]
    #[should_panic(expected = "does not match weight count")]
    fn activate_rejects_wrong_input_length() {
        let mut f = fixture(&[0.5, -1.0], 0.0);
        f.neuron.activate(&[1.0], &f.weights, ActivationFunction::Identity);
    }

    #[test_log::test]
    fn back_prop_stores_descent_steps() {
        let mut f = fixture(&[1.0, 1.0], 0.0);
        f.neuron.activate(&[0.5, 0.0], &f.weights, ActivationFunction::Identity);
        f.neuron.back_prop(ActivationFunction::Identity, &[0.5, 2.0], 0.4, 0.1, &mut f.gradients);

        assert!((f.neuron.error() - 0.4).abs() < 1e-12);
        assert!((f.neuron.bias_gradient() + 0.04).abs() < 1e-12);
        let g = f.gradients.view(f.neuron.gradients());
        assert!((g[0] + 0.02).abs() < 1e-12);
        assert!((g[1] + 0.08).abs() < 1e-12);
    }

    #[test_log::test]
    fn update_accumulates_momentum_then_applies_it() {
        let mut f = fixture(&[1.0], 0.0);
        f.neuron.activate(&[1.0], &f.weights, ActivationFunction::Identity);
        f.neuron.back_prop(ActivationFunction::Identity, &[1.0], 1.0, 0.1, &mut f.gradients);

        f.neuron.update(0.5, false, &mut f.weights, &f.gradients, &mut f.momentum);
        // m = 0.5 * -0.1; w = 1.0 + m + g
        assert!((f.momentum.view(f.neuron.momentum())[0] + 0.05).abs() < 1e-12);
        assert!((f.weights.view(f.neuron.weights())[0] - 0.85).abs() < 1e-12);
        assert!((f.neuron.bias() + 0.1).abs() < 1e-12);

        f.neuron.update(0.5, false, &mut f.weights, &f.gradients, &mut f.momentum);
        assert!((f.momentum.view(f.neuron.momentum())[0] + 0.1).abs() < 1e-12);
        assert!((f.weights.view(f.neuron.weights())[0] - 0.65).abs() < 1e-12);
    }

    #[test_log::test]
    fn reset_zeroes_momentum_before_applying_gradient() {
        let mut f = fixture(&[1.0], 0.0);
        f.neuron.activate(&[1.0], &f.weights, ActivationFunction::Identity);
        f.neuron.back_prop(ActivationFunction::Identity, &[1.0], 1.0, 0.1, &mut f.gradients);
        f.neuron.update(0.5, false, &mut f.weights, &f.gradients, &mut f.momentum);
        let before = f.weights.view(f.neuron.weights())[0];

        f.neuron.update(0.5, true, &mut f.weights, &f.gradients, &mut f.momentum);
        assert_eq!(f.momentum.view(f.neuron.momentum())[0], 0.0);
        assert!((f.weights.view(f.neuron.weights())[0] - (before - 0.1)).abs() < 1e-12);
    }

    #[test_log::test]
    fn zero_coefficient_keeps_momentum_clear() {
        let mut f = fixture(&[1.0], 0.0);
        f.momentum.view_mut(f.neuron.momentum())[0] = 3.0;
        f.neuron.update(0.0, false, &mut f.weights, &f.gradients, &mut f.momentum);
        assert_eq!(f.momentum.view(f.neuron.momentum())[0], 0.0);
        assert_eq!(f.weights.view(f.neuron.weights())[0], 1.0);
    }
}
