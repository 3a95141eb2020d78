use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Serialize, Deserialize};

use crate::data::dataset::DataPoint;
use crate::layers::dense::{Downstream, Layer};
use crate::loss::mse::{ErrorData, MseLoss};
use crate::network::spec::NetworkSpec;
use crate::optim::sgd::Sgd;

#[derive(Debug, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    /// Averaged derivative of the previous `train_epoch`.
    #[serde(skip)]
    last_epoch_derivative: Option<f64>,
    #[serde(skip)]
    reset_momentum_next: bool,
}

impl Network {
    /// Wraps an ordered stack of layers.
    ///
    /// # Panics
    /// Panics if `layers` is empty or adjacent layers disagree on size.
    pub fn new(layers: Vec<Layer>) -> Network {
        assert!(!layers.is_empty(), "a network needs at least one layer");
        for pair in layers.windows(2) {
            assert_eq!(
                pair[0].size,
                pair[1].input_size,
                "layer {} outputs {} values but layer {} expects {}",
                pair[0].id,
                pair[0].size,
                pair[1].id,
                pair[1].input_size
            );
        }
        Network {
            layers,
            last_epoch_derivative: None,
            reset_momentum_next: false,
        }
    }

    /// Builds every layer of `spec` from a single RNG seeded with `spec.seed`.
    pub fn from_spec(spec: &NetworkSpec) -> Network {
        let mut rng = StdRng::seed_from_u64(spec.seed);
        let layers = spec.layers.iter()
            .enumerate()
            .map(|(id, l)| Layer::new(
                id,
                l.size,
                l.input_size,
                l.activation,
                spec.weight_init,
                spec.bias_init,
                &mut rng,
            ))
            .collect();
        Network::new(layers)
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size
    }

    /// Forward pass; each layer caches its output for backprop.
    pub fn execute(&mut self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &mut self.layers {
            current = layer.call(&current).to_vec();
        }
        current
    }

    /// One forward/backward/update cycle on a single example.
    pub fn train(&mut self, point: &DataPoint, optimizer: &Sgd) -> ErrorData {
        let expected = point.expected();
        self.execute(&point.bins);

        let mut total = ErrorData::default();
        for i in (0..self.layers.len()).rev() {
            // Split so layer i can be mutated while its neighbours are read.
            let (before, rest) = self.layers.split_at_mut(i);
            let (current, after) = rest.split_at_mut(1);

            let previous_outputs = match before.last() {
                Some(previous) => previous.outputs(),
                None => point.bins.as_slice(),
            };
            let downstream = match after.first() {
                Some(next) => Downstream::Next(next),
                None => Downstream::Expected(&expected),
            };
            total += current[0].back_prop(previous_outputs, downstream, optimizer.learning_rate);
        }

        let reset = std::mem::take(&mut self.reset_momentum_next);
        for layer in &mut self.layers {
            layer.update(optimizer.momentum, reset);
        }
        total
    }

    /// Trains on every example `repeats_per_example` times and returns the
    /// error averaged over all those steps.
    ///
    /// When the sign of the averaged derivative differs from the previous
    /// epoch's, momentum is discarded at the first update of the next epoch.
    ///
    /// # Panics
    /// Panics if `data` is empty or `repeats_per_example == 0`.
    pub fn train_epoch(&mut self, data: &[DataPoint], optimizer: &Sgd, repeats_per_example: usize) -> ErrorData {
        assert!(!data.is_empty(), "cannot train on an empty dataset");
        assert!(repeats_per_example > 0, "repeats_per_example must be at least 1");

        let mut total = ErrorData::default();
        for point in data {
            for _ in 0..repeats_per_example {
                total += self.train(point, optimizer);
            }
        }
        let average = total / (data.len() * repeats_per_example) as f64;

        if let Some(previous) = self.last_epoch_derivative {
            if previous.is_sign_negative() != average.d_error.is_sign_negative() {
                debug!(
                    "error derivative changed sign ({:.6} -> {:.6}); momentum resets next epoch",
                    previous, average.d_error
                );
                self.reset_momentum_next = true;
            }
        }
        self.last_epoch_derivative = Some(average.d_error);

        average
    }

    /// Mean error over `data` without touching the weights.
    ///
    /// # Panics
    /// Panics if `data` is empty.
    pub fn error(&mut self, data: &[DataPoint]) -> ErrorData {
        assert!(!data.is_empty(), "cannot evaluate an empty dataset");
        let mut total = ErrorData::default();
        for point in data {
            let output = self.execute(&point.bins);
            total += MseLoss::evaluate(&output, &point.expected());
        }
        total / data.len() as f64
    }

    /// Fraction of `data` classified with the right label; `0.0` when empty.
    pub fn correct(&mut self, data: &[DataPoint]) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let hits = data.iter()
            .filter(|point| predicts_bad(&self.execute(&point.bins)) == point.is_bad)
            .count();
        hits as f64 / data.len() as f64
    }

    /// Whether the first update of the next `train` call discards momentum.
    pub fn momentum_reset_pending(&self) -> bool {
        self.reset_momentum_next
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

/// Reads a `[good, bad]` output pair as a label.
pub fn predicts_bad(output: &[f64]) -> bool {
    output.len() >= 2 && output[1] > output[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::init::initializer::Initializer;
    use crate::network::spec::LayerSpec;

    fn two_layer_spec(seed: u64) -> NetworkSpec {
        NetworkSpec::stacked(3, 1, 4, 2, ActivationFunction::Sigmoid).with_seed(seed)
    }

    fn toy_data() -> Vec<DataPoint> {
        vec![
            DataPoint::new(false, vec![1.0, 0.0, 0.0]),
            DataPoint::new(false, vec![0.8, 0.6, 0.0]),
            DataPoint::new(true, vec![0.0, 0.0, 1.0]),
            DataPoint::new(true, vec![0.0, 0.6, 0.8]),
        ]
    }

    #[test_log::test]
    fn execute_returns_last_layer_width() {
        let mut network = Network::from_spec(&two_layer_spec(1));
        assert_eq!(network.execute(&[0.1, 0.2, 0.3]).len(), network.output_size());
        assert_eq!(network.output_size(), 2);
    }

    #[test_log::test]
    fn same_seed_builds_identical_networks() {
        let a = Network::from_spec(&two_layer_spec(9));
        let b = Network::from_spec(&two_layer_spec(9));
        for (la, lb) in a.layers.iter().zip(&b.layers) {
            assert_eq!(la.weights(), lb.weights());
        }
    }

    #[test_log::test]
    #[should_panic(expected = "outputs 4 values")]
    fn mismatched_layers_panic() {
        let mut rng = StdRng::seed_from_u64(0);
        Network::new(vec![
            Layer::new(0, 4, 3, ActivationFunction::Sigmoid, Initializer::Zero, Initializer::Zero, &mut rng),
            Layer::new(1, 2, 5, ActivationFunction::Sigmoid, Initializer::Zero, Initializer::Zero, &mut rng),
        ]);
    }

    #[test_log::test]
    fn error_is_mean_of_half_squared_differences() {
        let data = toy_data();
        let mut network = Network::from_spec(&two_layer_spec(3));

        let mut expected = 0.0;
        for p in &data {
            let out = network.execute(&p.bins);
            expected += out.iter().zip(p.expected()).map(|(o, e)| 0.5 * (o - e).powi(2)).sum::<f64>();
        }
        expected /= data.len() as f64;

        let err = network.error(&data);
        assert!(err.error >= 0.0);
        assert!((err.error - expected).abs() < 1e-12);
    }

    #[test_log::test]
    fn error_does_not_modify_weights() {
        let data = toy_data();
        let mut network = Network::from_spec(&two_layer_spec(3));
        let before: Vec<Vec<f64>> = network.layers.iter().map(|l| l.weights().to_vec()).collect();
        network.error(&data);
        let after: Vec<Vec<f64>> = network.layers.iter().map(|l| l.weights().to_vec()).collect();
        assert_eq!(before, after);
    }

    #[test_log::test]
    fn training_lowers_error() {
        let data = toy_data();
        let mut network = Network::from_spec(&two_layer_spec(5));
        let optimizer = Sgd::new(0.5);
        let start = network.error(&data).error;
        for _ in 0..200 {
            network.train_epoch(&data, &optimizer, 1);
        }
        assert!(network.error(&data).error < start);
    }

    #[test_log::test]
    fn derivative_sign_flip_schedules_and_applies_momentum_reset() {
        // Zero weights and a large positive bias push both outputs towards 1,
        // so the summed derivative (o0 + o1 - 1) is positive.
        let spec = NetworkSpec {
            name: "flip".into(),
            layers: vec![LayerSpec { size: 2, input_size: 3, activation: ActivationFunction::Sigmoid }],
            weight_init: Initializer::Zero,
            bias_init: Initializer::Constant { value: 3.0 },
            seed: 0,
        };
        let mut network = Network::from_spec(&spec);
        let optimizer = Sgd::with_momentum(0.1, 0.9);
        let data = toy_data();

        network.last_epoch_derivative = Some(-1.0);
        let avg = network.train_epoch(&data, &optimizer, 1);
        assert!(avg.d_error > 0.0);
        assert!(network.momentum_reset_pending());
        assert!(network.layers[0].momentum().iter().any(|&m| m != 0.0));

        network.train(&data[0], &optimizer);
        assert!(!network.momentum_reset_pending());
        assert!(network.layers[0].momentum().iter().all(|&m| m == 0.0));

        // Accumulation resumes on the following step.
        network.train(&data[1], &optimizer);
        assert!(network.layers[0].momentum().iter().any(|&m| m != 0.0));
    }

    #[test_log::test]
    fn reset_is_scheduled_only_on_a_sign_change() {
        let mut network = Network::from_spec(&two_layer_spec(2));
        let optimizer = Sgd::with_momentum(0.1, 0.5);
        let data = toy_data();

        let first = network.train_epoch(&data, &optimizer, 1);
        assert!(!network.momentum_reset_pending());

        let second = network.train_epoch(&data, &optimizer, 1);
        let flipped = first.d_error.is_sign_negative() != second.d_error.is_sign_negative();
        assert_eq!(network.momentum_reset_pending(), flipped);
    }

    #[test_log::test]
    #[should_panic(expected = "empty dataset")]
    fn train_epoch_rejects_empty_data() {
        let mut network = Network::from_spec(&two_layer_spec(1));
        network.train_epoch(&[], &Sgd::default(), 1);
    }

    #[test_log::test]
    fn json_round_trip_preserves_predictions() {
        let mut network = Network::from_spec(&two_layer_spec(4));
        let path = std::env::temp_dir().join(format!("binclass-nn-{}.json", std::process::id()));
        let path = path.to_str().unwrap();

        network.save_json(path).unwrap();
        let mut loaded = Network::load_json(path).unwrap();
        std::fs::remove_file(path).ok();

        let input = [0.3, 0.3, 0.4];
        for (a, b) in network.execute(&input).iter().zip(loaded.execute(&input)) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test_log::test]
    fn predicts_bad_compares_the_two_scores() {
        assert!(predicts_bad(&[0.2, 0.7]));
        assert!(!predicts_bad(&[0.7, 0.2]));
        assert!(!predicts_bad(&[0.5]));
    }
}
