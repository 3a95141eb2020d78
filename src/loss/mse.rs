use std::ops::{Add, AddAssign, Div};

use serde::{Deserialize, Serialize};

/// Aggregated squared error and its first derivative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    pub error: f64,
    pub d_error: f64,
}

impl ErrorData {
    pub fn new(error: f64, d_error: f64) -> ErrorData {
        ErrorData { error, d_error }
    }
}

impl Add for ErrorData {
    type Output = ErrorData;

    fn add(self, rhs: Self) -> Self::Output {
        ErrorData::new(self.error + rhs.error, self.d_error + rhs.d_error)
    }
}

impl AddAssign for ErrorData {
    fn add_assign(&mut self, rhs: Self) {
        self.error += rhs.error;
        self.d_error += rhs.d_error;
    }
}

impl Div<f64> for ErrorData {
    type Output = ErrorData;

    fn div(self, rhs: f64) -> Self::Output {
        ErrorData::new(self.error / rhs, self.d_error / rhs)
    }
}

pub struct MseLoss;

impl MseLoss {
    /// Contribution of one output difference: (0.5·diff², diff).
    pub fn term(diff: f64) -> ErrorData {
        ErrorData::new(0.5 * diff * diff, diff)
    }

    /// Loss and summed derivative for one output vector.
    pub fn evaluate(predicted: &[f64], expected: &[f64]) -> ErrorData {
        assert_eq!(
            predicted.len(),
            expected.len(),
            "predicted and expected vectors must have equal length"
        );
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| Self::term(p - e))
            .fold(ErrorData::default(), |acc, t| acc + t)
    }
}
