use ndarray::Array1;

use crate::error::{Error, Result};

// Network values live in [0.1, 0.9]. Errors are differences and are scaled
// back without the offset.
const LOW: f64 = 0.1;
const SPAN: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    /// Human value to normalised network value.
    ToNetwork,
    /// Normalised network value back to human value.
    ToHuman,
    /// Normalised error magnitude to a human error magnitude.
    ErrorToHuman,
}

/// Scale `value` whose column spans `[min, max]` in `direction`.
/// A column with `min == max` has no range and is passed through unchanged.
pub fn scale(value: f64, min: f64, max: f64, direction: ScaleDirection) -> f64 {
    if min == max {
        return value;
    }

    match direction {
        ScaleDirection::ToNetwork => LOW + SPAN * (value - min) / (max - min),
        ScaleDirection::ToHuman => min + (max - min) * (value - LOW) / SPAN,
        ScaleDirection::ErrorToHuman => value * (max - min) / SPAN,
    }
}

/// Per-column bounds of a dataset: every input column first, then every output column.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBounds {
    min: Array1<f64>,
    max: Array1<f64>,
    num_inputs: usize,
}

impl ScaleBounds {
    pub fn new(min: Array1<f64>, max: Array1<f64>, num_inputs: usize) -> Result<Self> {
        if min.len() != max.len() {
            return Err(Error::Format(format!(
                "{} minimum bounds but {} maximum bounds",
                min.len(),
                max.len()
            )));
        }
        if num_inputs > min.len() {
            return Err(Error::Format(format!(
                "{} input columns but only {} bounds",
                num_inputs,
                min.len()
            )));
        }
        Ok(Self {
            min,
            max,
            num_inputs,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.min.len() - self.num_inputs
    }

    /// Bounds `(min, max)` of input column `i`.
    pub fn input_bounds(&self, i: usize) -> (f64, f64) {
        assert!(i < self.num_inputs, "input column {i} out of range");
        (self.min[i], self.max[i])
    }

    /// Bounds `(min, max)` of output column `k`.
    pub fn output_bounds(&self, k: usize) -> (f64, f64) {
        let column = self.num_inputs + k;
        assert!(column < self.min.len(), "output column {k} out of range");
        (self.min[column], self.max[column])
    }

    pub fn input(&self, i: usize, value: f64, direction: ScaleDirection) -> f64 {
        let (min, max) = self.input_bounds(i);
        scale(value, min, max, direction)
    }

    pub fn output(&self, k: usize, value: f64, direction: ScaleDirection) -> f64 {
        let (min, max) = self.output_bounds(k);
        scale(value, min, max, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn to_network_maps_range_onto_headroom_interval() {
        assert_relative_eq!(0.1, scale(-2.0, -2.0, 6.0, ScaleDirection::ToNetwork));
        assert_relative_eq!(0.5, scale(2.0, -2.0, 6.0, ScaleDirection::ToNetwork));
        assert_relative_eq!(0.9, scale(6.0, -2.0, 6.0, ScaleDirection::ToNetwork));
    }

    #[test]
    fn round_trip_recovers_value() {
        for &(v, min, max) in &[(3.7, 0.0, 10.0), (-4.25, -5.0, 5.0), (120.0, 100.0, 250.0)] {
            let net = scale(v, min, max, ScaleDirection::ToNetwork);
            let human = scale(net, min, max, ScaleDirection::ToHuman);
            assert_relative_eq!(v, human, epsilon = 1e-12);
        }
    }

    #[test]
    fn no_range_is_identity() {
        for direction in [
            ScaleDirection::ToNetwork,
            ScaleDirection::ToHuman,
            ScaleDirection::ErrorToHuman,
        ] {
            assert_eq!(42.5, scale(42.5, 3.0, 3.0, direction));
        }
    }

    #[test]
    fn error_scaling_has_no_offset() {
        // 0.08 in network units is a tenth of the span.
        assert_relative_eq!(1.0, scale(0.08, 0.0, 10.0, ScaleDirection::ErrorToHuman));
        assert_relative_eq!(0.0, scale(0.0, 0.0, 10.0, ScaleDirection::ErrorToHuman));
    }

    #[test]
    fn bounds_index_inputs_then_outputs() {
        let bounds =
            ScaleBounds::new(arr1(&[0.0, 10.0, 1.0]), arr1(&[1.0, 20.0, 1.0]), 2).unwrap();
        assert_eq!(1, bounds.num_outputs());
        assert_eq!((10.0, 20.0), bounds.input_bounds(1));
        assert_eq!((1.0, 1.0), bounds.output_bounds(0));
        assert_relative_eq!(0.5, bounds.input(1, 15.0, ScaleDirection::ToNetwork));
        assert_eq!(7.0, bounds.output(0, 7.0, ScaleDirection::ToHuman));
    }

    #[test]
    fn bounds_reject_mismatched_lengths() {
        assert!(ScaleBounds::new(arr1(&[0.0]), arr1(&[1.0, 2.0]), 1).is_err());
        assert!(ScaleBounds::new(arr1(&[0.0]), arr1(&[1.0]), 2).is_err());
    }
}
