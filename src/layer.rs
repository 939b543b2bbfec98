use ndarray::{s, Array, Array1, Array2, ArrayView1, Zip};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use crate::activation::Activation;

/// Dense layer of units sharing one fan-in and one activation.
///
/// Row `j` of `weights` belongs to unit `j`: column 0 is the bias weight and
/// column `k + 1` weighs input `k`. `prev_deltas` mirrors `weights` and keeps
/// the last applied change of every weight for the momentum term.
#[derive(Debug, Clone)]
pub struct Layer {
    activation: Activation,
    weights: Array2<f64>,
    prev_deltas: Array2<f64>,
    outputs: Array1<f64>,
    deltas: Array1<f64>,
}

/// Borrowed view of one unit of a [`Layer`].
#[derive(Debug, Clone, Copy)]
pub struct Unit<'a> {
    activation: Activation,
    weights: ArrayView1<'a, f64>,
    prev_deltas: ArrayView1<'a, f64>,
    output: f64,
    delta: f64,
}

impl<'a> Unit<'a> {
    pub fn fan_in(&self) -> usize {
        self.weights.len() - 1
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn bias(&self) -> f64 {
        self.weights[0]
    }

    /// All `fan_in + 1` weights, bias first.
    pub fn weights(&self) -> ArrayView1<'a, f64> {
        self.weights
    }

    pub fn prev_deltas(&self) -> ArrayView1<'a, f64> {
        self.prev_deltas
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }
}

impl Layer {
    /// Layer of `units` units reading `fan_in` inputs, with all weights zero.
    pub fn new(fan_in: usize, units: usize, activation: Activation) -> Self {
        Layer::with_weights(activation, Array2::zeros((units, fan_in + 1)))
    }

    /// Layer whose shape is taken from `weights` (`units` x `fan_in + 1`).
    pub fn with_weights(activation: Activation, weights: Array2<f64>) -> Self {
        assert!(
            weights.ncols() >= 1,
            "weight matrix needs at least the bias column"
        );
        let prev_deltas = Array2::zeros(weights.raw_dim());
        let outputs = Array1::zeros(weights.nrows());
        let deltas = Array1::zeros(weights.nrows());
        Self {
            activation,
            weights,
            prev_deltas,
            outputs,
            deltas,
        }
    }

    pub fn fan_in(&self) -> usize {
        self.weights.ncols() - 1
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.weights.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of weights including biases.
    pub fn num_weights(&self) -> usize {
        self.weights.len()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn outputs(&self) -> ArrayView1<f64> {
        self.outputs.view()
    }

    pub fn deltas(&self) -> ArrayView1<f64> {
        self.deltas.view()
    }

    pub fn unit(&self, index: usize) -> Unit<'_> {
        Unit {
            activation: self.activation,
            weights: self.weights.row(index),
            prev_deltas: self.prev_deltas.row(index),
            output: self.outputs[index],
            delta: self.deltas[index],
        }
    }

    pub fn units(&self) -> impl Iterator<Item = Unit<'_>> {
        (0..self.len()).map(move |j| self.unit(j))
    }

    /// Draw every weight uniformly from `[-1, 1]` and clear the momentum memory.
    pub fn randomize_weights<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.weights = Array::random_using(
            self.weights.raw_dim(),
            Uniform::new_inclusive(-1.0, 1.0),
            rng,
        );
        self.prev_deltas.fill(0.0);
    }

    /// Install `weights` in unit-then-weight-index order and clear the momentum memory.
    pub fn set_weights(&mut self, weights: &[f64]) {
        assert_eq!(
            weights.len(),
            self.num_weights(),
            "layer has {} weights, got {}",
            self.num_weights(),
            weights.len()
        );
        // Logical order is row-major.
        for (w, &v) in self.weights.iter_mut().zip(weights) {
            *w = v;
        }
        self.prev_deltas.fill(0.0);
    }

    /// Compute every unit's output from `inputs`.
    pub fn forward(&mut self, inputs: ArrayView1<f64>) -> ArrayView1<f64> {
        assert_eq!(
            inputs.len(),
            self.fan_in(),
            "layer expects {} inputs, got {}",
            self.fan_in(),
            inputs.len()
        );

        let sums = &self.weights.column(0) + &self.weights.slice(s![.., 1..]).dot(&inputs);
        self.outputs = self.activation.compute(sums.view());
        self.outputs.view()
    }

    /// Turn each unit's raw error signal into its delta using the cached outputs.
    pub fn compute_deltas(&mut self, signals: ArrayView1<f64>) {
        assert_eq!(signals.len(), self.len());
        self.deltas = &signals * &self.activation.derivative(self.outputs.view());
    }

    /// Error signal this layer sends to each of its inputs: `Σ_j delta_j * w_j[k + 1]`.
    /// The bias column is skipped.
    pub fn back_signal(&self) -> Array1<f64> {
        self.weights.slice(s![.., 1..]).t().dot(&self.deltas)
    }

    /// Apply `lr * input * delta + momentum * previous change` to every weight.
    /// `inputs` must be the values this layer saw in its last `forward`.
    pub fn update_weights(&mut self, inputs: ArrayView1<f64>, learning_rate: f64, momentum: f64) {
        assert_eq!(inputs.len(), self.fan_in());

        let mut extended = Array1::ones(inputs.len() + 1);
        extended.slice_mut(s![1..]).assign(&inputs);

        Zip::from(self.weights.rows_mut())
            .and(self.prev_deltas.rows_mut())
            .and(&self.deltas)
            .for_each(|mut weights, mut prev_deltas, &delta| {
                Zip::from(&mut weights)
                    .and(&mut prev_deltas)
                    .and(&extended)
                    .for_each(|w, prev, &input| {
                        let change = learning_rate * input * delta + momentum * *prev;
                        *w += change;
                        *prev = change;
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use crate::{assert_rel_eq_arr1, assert_rel_eq_arr2};

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};
    use ndarray_rand::rand::{rngs::StdRng, SeedableRng};

    fn prepare_layer() -> Layer {
        let weights = arr2(&[[-2.0, 1.0, -1.0, 0.5], [-0.5, 2.0, -1.0, 2.0]]);
        Layer::with_weights(Activation::Logistic, weights)
    }

    #[test]
    fn layer_forward_backward() {
        let mut layer = prepare_layer();
        let inputs = arr1(&[1.0, 0.5, -0.5]);
        let outputs = layer.forward(inputs.view()).to_owned();
        assert_rel_eq_arr1!(outputs, arr1(&[0.14804719803168948, 0.5]));

        let target = arr1(&[1.0, 0.0]);
        let error = target - &outputs;
        layer.compute_deltas(error.view());
        assert_rel_eq_arr1!(layer.deltas(), arr1(&[0.10745614680786288, -0.125]));

        assert_rel_eq_arr1!(
            layer.back_signal(),
            arr1(&[
                -0.14254385319213714,
                0.017543853192137124,
                -0.19627192659606857
            ])
        );
    }

    #[test]
    fn update_weights_with_momentum() {
        let mut layer = prepare_layer();
        let inputs = arr1(&[1.0, 0.5, -0.5]);
        let outputs = layer.forward(inputs.view()).to_owned();
        let error = arr1(&[1.0, 0.0]) - &outputs;
        layer.compute_deltas(error.view());

        layer.update_weights(inputs.view(), 0.5, 0.9);
        assert_rel_eq_arr2!(
            layer.weights().clone(),
            arr2(&[
                [
                    -1.9462719265960686,
                    1.0537280734039314,
                    -0.9731359632980343,
                    0.47313596329803426
                ],
                [-0.5625, 1.9375, -1.03125, 2.03125],
            ])
        );

        // Same deltas again: the previous change is carried with factor 0.9.
        layer.update_weights(inputs.view(), 0.5, 0.9);
        assert_rel_eq_arr1!(
            layer.unit(0).prev_deltas(),
            arr1(&[
                0.10208333946746972,
                0.10208333946746972,
                0.05104166973373486,
                -0.05104166973373486
            ])
        );
        assert_rel_eq_arr1!(
            layer.unit(1).prev_deltas(),
            arr1(&[-0.11875, -0.11875, -0.059375, 0.059375])
        );
    }

    #[test]
    fn unit_view_reads_row() {
        let mut layer = prepare_layer();
        layer.forward(arr1(&[1.0, 0.5, -0.5]).view());
        let unit = layer.unit(1);
        assert_eq!(3, unit.fan_in());
        assert_eq!(-0.5, unit.bias());
        assert_eq!(Activation::Logistic, unit.activation());
        assert_relative_eq!(0.5, unit.output());
        assert_eq!(2, layer.units().count());
    }

    #[test]
    fn set_weights_is_row_major_and_resets_momentum() {
        let mut layer = Layer::new(2, 2, Activation::Identity);
        layer.set_weights(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_rel_eq_arr2!(
            layer.weights().clone(),
            arr2(&[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]])
        );
        assert!(layer.unit(0).prev_deltas().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn random_weights_stay_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut layer = Layer::new(5, 4, Activation::Logistic);
        layer.randomize_weights(&mut rng);
        assert!(layer.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
        assert!(layer.weights().iter().any(|&w| w != 0.0));
    }

    #[test]
    #[should_panic]
    fn forward_panics_on_input_width_mismatch() {
        let mut layer = prepare_layer();
        layer.forward(arr1(&[1.0, 2.0]).view());
    }
}
