use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::init::initializer::Initializer;
use crate::layers::neuron::Neuron;
use crate::loss::mse::{ErrorData, MseLoss};
use crate::math::arena::WeightArena;

/// What a layer propagates its error against.
///
/// Decided by position in the network: the last layer sees the expected
/// output, every other layer sees its successor.
#[derive(Debug, Clone, Copy)]
pub enum Downstream<'a> {
    Expected(&'a [f64]),
    Next(&'a Layer),
}

/// Fully-connected layer. Weights, weight gradients and momentum for all
/// neurons live in three arenas sized `size * input_size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: usize,
    pub size: usize,
    pub input_size: usize,
    pub activator: ActivationFunction,
    neurons: Vec<Neuron>,
    weights: WeightArena,
    gradients: WeightArena,
    momentum: WeightArena,
    #[serde(skip)]
    outputs: Vec<f64>,
}

impl Layer {
    pub fn new<R: Rng>(
        id: usize,
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        weight_init: Initializer,
        bias_init: Initializer,
        rng: &mut R,
    ) -> Layer {
        assert!(size > 0, "layer {} must have at least one neuron", id);
        let total = size * input_size;
        let mut weights = WeightArena::preallocate(total);
        let mut gradients = WeightArena::preallocate(total);
        let mut momentum = WeightArena::preallocate(total);

        // Views for one neuron come from the three arenas in lock-step.
        let neurons: Vec<Neuron> = (0..size)
            .map(|j| Neuron::new(
                bias_init.value(j, rng),
                weights.allocate_view(input_size),
                gradients.allocate_view(input_size),
                momentum.allocate_view(input_size),
            ))
            .collect();

        weights.seal();
        gradients.seal();
        momentum.seal();

        for neuron in &neurons {
            weight_init.fill(weights.view_mut(neuron.weights()), rng);
        }

        Layer {
            id,
            size,
            input_size,
            activator: activation,
            neurons,
            weights,
            gradients,
            momentum,
            outputs: vec![0.0; size],
        }
    }

    /// Forward pass. The result is cached for the backward pass.
    pub fn call(&mut self, inputs: &[f64]) -> &[f64] {
        assert_eq!(
            inputs.len(),
            self.input_size,
            "layer {} expects {} inputs, got {}",
            self.id,
            self.input_size,
            inputs.len()
        );
        self.outputs.clear();
        for neuron in &mut self.neurons {
            self.outputs.push(neuron.activate(inputs, &self.weights, self.activator));
        }
        &self.outputs
    }

    /// Backward pass for one example.
    ///
    /// `previous_outputs` is what this layer consumed in the forward pass
    /// (the raw input for the first layer). Only the output layer reports a
    /// loss term; hidden layers return zero.
    pub fn back_prop(
        &mut self,
        previous_outputs: &[f64],
        downstream: Downstream<'_>,
        learning_rate: f64,
    ) -> ErrorData {
        let mut total = ErrorData::default();

        match downstream {
            Downstream::Expected(expected) => assert_eq!(
                expected.len(),
                self.size,
                "layer {} has {} outputs but {} expected values were given",
                self.id,
                self.size,
                expected.len()
            ),
            Downstream::Next(next) => assert_eq!(
                next.input_size,
                self.size,
                "layer {} feeds {} values into layer {} which expects {}",
                self.id,
                self.size,
                next.id,
                next.input_size
            ),
        }

        for (i, neuron) in self.neurons.iter_mut().enumerate() {
            let upstream_error = match downstream {
                Downstream::Expected(expected) => {
                    let diff = neuron.output() - expected[i];
                    total += MseLoss::term(diff);
                    diff
                }
                Downstream::Next(next) => next.error_for_input(i),
            };
            neuron.back_prop(self.activator, previous_outputs, upstream_error, learning_rate, &mut self.gradients);
        }

        total
    }

    /// Applies the pending gradients of every neuron.
    pub fn update(&mut self, momentum_coefficient: f64, reset_momentum: bool) {
        for neuron in &mut self.neurons {
            neuron.update(
                momentum_coefficient,
                reset_momentum,
                &mut self.weights,
                &self.gradients,
                &mut self.momentum,
            );
        }
    }

    /// Error flowing back into input `i`: column `i` of the weight matrix
    /// dotted with the neurons' local errors.
    fn error_for_input(&self, i: usize) -> f64 {
        self.neurons.iter()
            .map(|n| n.error() * self.weights.view(n.weights())[i])
            .sum()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Outputs of the last forward pass.
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    pub fn neuron_weights(&self, j: usize) -> &[f64] {
        self.weights.view(self.neurons[j].weights())
    }

    pub fn neuron_weights_mut(&mut self, j: usize) -> &mut [f64] {
        let view = self.neurons[j].weights();
        self.weights.view_mut(view)
    }

    pub fn neuron_gradients(&self, j: usize) -> &[f64] {
        self.gradients.view(self.neurons[j].gradients())
    }

    pub fn neuron_momentum(&self, j: usize) -> &[f64] {
        self.momentum.view(self.neurons[j].momentum())
    }

    /// Every weight of the layer, row-major by neuron.
    pub fn weights(&self) -> &[f64] {
        self.weights.as_slice()
    }

    pub fn momentum(&self) -> &[f64] {
        self.momentum.as_slice()
    }
}
