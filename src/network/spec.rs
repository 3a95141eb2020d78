use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;
use crate::init::initializer::Initializer;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       - number of neurons in this layer
/// - `input_size` - number of values feeding into this layer (the previous
///                  layer's size, or the bin count for the first layer)
/// - `activation` - activation function applied to every neuron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// Architecture, initialisation and seed of a network.
///
/// Building the same `NetworkSpec` twice yields identical starting weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub weight_init: Initializer,
    #[serde(default)]
    pub bias_init: Initializer,
    #[serde(default)]
    pub seed: u64,
}

impl NetworkSpec {
    /// `input_size → hidden_count × hidden_size → output_size`, one
    /// activation for every layer. With no hidden layers the network is a
    /// single `input_size → output_size` layer.
    pub fn stacked(
        input_size: usize,
        hidden_count: usize,
        hidden_size: usize,
        output_size: usize,
        activation: ActivationFunction,
    ) -> NetworkSpec {
        let mut layers = Vec::with_capacity(hidden_count + 1);
        let mut prev = input_size;
        for _ in 0..hidden_count {
            layers.push(LayerSpec { size: hidden_size, input_size: prev, activation });
            prev = hidden_size;
        }
        layers.push(LayerSpec { size: output_size, input_size: prev, activation });

        NetworkSpec {
            name: format!("net-{}x{}", hidden_count, hidden_size),
            layers,
            weight_init: Initializer::default(),
            bias_init: Initializer::default(),
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_initializers(mut self, weight_init: Initializer, bias_init: Initializer) -> Self {
        self.weight_init = weight_init;
        self.bias_init = bias_init;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
