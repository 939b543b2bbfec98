use std::{fmt, str::FromStr};

use ndarray::{Array1, ArrayView1};

use crate::error::Error;

/// Activation applied by every unit of a layer to its raw weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Output is the raw sum.
    Identity,
    /// Output is `1 / (1 + e^-sum)`.
    Logistic,
}

impl Activation {
    fn compute_one(self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Logistic => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Derivative with respect to the raw sum, expressed through the unit's own output `y`.
    fn derivative_one(self, y: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::Logistic => y * (1.0 - y),
        }
    }

    pub fn compute(self, x: ArrayView1<f64>) -> Array1<f64> {
        x.map(|&v| self.compute_one(v))
    }

    pub fn derivative(self, outputs: ArrayView1<f64>) -> Array1<f64> {
        outputs.map(|&y| self.derivative_one(y))
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "linear" | "lin" => Ok(Activation::Identity),
            "logistic" | "sigmoid" | "sig" => Ok(Activation::Logistic),
            _ => Err(Error::UnknownActivation(s.to_string())),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Identity => write!(f, "identity"),
            Activation::Logistic => write!(f, "logistic"),
        }
    }
}
