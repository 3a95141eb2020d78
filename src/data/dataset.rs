use serde::{Deserialize, Serialize};

/// Expected output for a good example: `[good, bad]`.
pub const GOOD_TARGET: [f64; 2] = [1.0, 0.0];
/// Expected output for a bad example.
pub const BAD_TARGET: [f64; 2] = [0.0, 1.0];

/// One labelled feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub is_bad: bool,
    pub bins: Vec<f64>,
}

impl DataPoint {
    pub fn new(is_bad: bool, bins: Vec<f64>) -> DataPoint {
        DataPoint { is_bad, bins }
    }

    /// Two-element training target for this example's label.
    pub fn expected(&self) -> [f64; 2] {
        if self.is_bad { BAD_TARGET } else { GOOD_TARGET }
    }

    pub fn magnitude(&self) -> f64 {
        self.bins.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Copy scaled to unit Euclidean norm. A zero vector is returned unchanged.
    pub fn normalize(&self) -> DataPoint {
        let mag = self.magnitude();
        let mut data = self.clone();
        if mag > 0.0 {
            data.bins.iter_mut().for_each(|v| *v /= mag);
        }
        data
    }

    /// Copy extended with `padding_value` up to `desired_size` bins.
    /// Longer vectors are left as they are.
    pub fn with_padding(&self, desired_size: usize, padding_value: f64) -> DataPoint {
        let mut data = self.clone();
        if data.bins.len() < desired_size {
            data.bins.resize(desired_size, padding_value);
        }
        data
    }
}

/// All examples read from one dataset file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    pub data_points: Vec<DataPoint>,
}

impl DataFile {
    pub fn new(data_points: Vec<DataPoint>) -> DataFile {
        DataFile { data_points }
    }

    pub fn len(&self) -> usize {
        self.data_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty()
    }

    /// Feature dimension, taken from the first example.
    pub fn bin_count(&self) -> Option<usize> {
        self.data_points.first().map(|p| p.bins.len())
    }

    pub fn bad_count(&self) -> usize {
        self.data_points.iter().filter(|p| p.is_bad).count()
    }
}
