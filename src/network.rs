use std::str::FromStr;

use ndarray::{Array1, ArrayView1};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::{thread_rng, Rng, SeedableRng};

use crate::activation::Activation;
use crate::data::DataRecord;
use crate::error::{Error, Result};
use crate::layer::Layer;

/// Rule used to adapt the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LearningMethod {
    #[default]
    Backpropagation,
    /// Recognised so it can be rejected with a precise error; never implemented.
    Hebbian,
}

impl FromStr for LearningMethod {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backpropagation" | "backprop" | "bprop" => Ok(LearningMethod::Backpropagation),
            "hebbian" | "hebb" => Ok(LearningMethod::Hebbian),
            _ => Err(Error::UnknownLearningMethod(s.to_string())),
        }
    }
}

/// Training hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnParameters {
    pub epoch_max: usize,
    pub learning_rate: f64,
    pub momentum: f64,
}

impl Default for LearnParameters {
    fn default() -> Self {
        Self {
            epoch_max: 1000,
            learning_rate: 0.5,
            momentum: 0.5,
        }
    }
}

impl LearnParameters {
    /// Replace out-of-range values by their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = LearnParameters::default();
        let mut params = self;
        if params.epoch_max == 0 {
            log::warn!("epoch_max 0 replaced by {}", defaults.epoch_max);
            params.epoch_max = defaults.epoch_max;
        }
        if !(params.learning_rate.is_finite() && params.learning_rate >= 0.0) {
            log::warn!(
                "learning rate {} replaced by {}",
                params.learning_rate,
                defaults.learning_rate
            );
            params.learning_rate = defaults.learning_rate;
        }
        if !(params.momentum.is_finite() && params.momentum >= 0.0) {
            log::warn!(
                "momentum {} replaced by {}",
                params.momentum,
                defaults.momentum
            );
            params.momentum = defaults.momentum;
        }
        params
    }
}

/// Builder for a [`Network`].
///
/// ```
/// use bprop::{Activation, NetworkBuilder};
///
/// # fn main() -> bprop::Result<()> {
/// let net = NetworkBuilder::new(2)
///     .layers(&[3, 1])
///     .activation(Activation::Logistic)
///     .build_with_seed(0)?;
/// assert_eq!(1, net.num_outputs());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    input_width: usize,
    layer_sizes: Vec<usize>,
    activation: Activation,
    learning: LearningMethod,
    params: LearnParameters,
}

impl NetworkBuilder {
    pub fn new(input_width: usize) -> Self {
        Self {
            input_width,
            layer_sizes: Vec::new(),
            activation: Activation::Logistic,
            learning: LearningMethod::Backpropagation,
            params: LearnParameters::default(),
        }
    }

    /// Unit count of every layer, the last one being the output layer.
    pub fn layers(mut self, sizes: &[usize]) -> Self {
        self.layer_sizes = sizes.to_vec();
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn learning(mut self, learning: LearningMethod) -> Self {
        self.learning = learning;
        self
    }

    pub fn learn_parameters(mut self, params: LearnParameters) -> Self {
        self.params = params;
        self
    }

    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        let mut net = self.build_zeroed()?;
        net.set_weights_with_rng(rng);
        Ok(net)
    }

    /// Build with weights drawn from the thread-local RNG.
    pub fn build(self) -> Result<Network> {
        self.build_with_rng(&mut thread_rng())
    }

    fn build_zeroed(self) -> Result<Network> {
        if self.layer_sizes.is_empty() {
            return Err(Error::EmptyTopology);
        }
        if self.input_width == 0 {
            return Err(Error::ZeroInputWidth);
        }
        if self.learning == LearningMethod::Hebbian {
            return Err(Error::UnsupportedLearningMethod("hebbian"));
        }

        let mut layers = Vec::with_capacity(self.layer_sizes.len());
        let mut fan_in = self.input_width;
        for (index, &units) in self.layer_sizes.iter().enumerate() {
            if units == 0 {
                return Err(Error::ZeroLayerSize(index));
            }
            layers.push(Layer::new(fan_in, units, self.activation));
            fan_in = units;
        }

        log::info!(
            "created network: {} inputs, layers {:?}, {} activation",
            self.input_width,
            self.layer_sizes,
            self.activation
        );

        Ok(Network {
            layers,
            input_width: self.input_width,
            params: self.params.sanitized(),
            epoch: 0,
        })
    }
}

/// Feed-forward network of dense layers trained by back-propagation with momentum.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    input_width: usize,
    params: LearnParameters,
    epoch: usize,
}

impl Network {
    /// Network with `layer_sizes` units per layer over `input_width` inputs,
    /// every unit using `activation`, weights random in `[-1, 1]`.
    pub fn new(layer_sizes: &[usize], input_width: usize, activation: Activation) -> Result<Self> {
        NetworkBuilder::new(input_width)
            .layers(layer_sizes)
            .activation(activation)
            .build()
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn num_outputs(&self) -> usize {
        self.layers.last().map_or(0, Layer::len)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn learn_parameters(&self) -> LearnParameters {
        self.params
    }

    pub fn set_learn_parameters(&mut self, params: LearnParameters) {
        self.params = params.sanitized();
    }

    /// Completed epochs of the most recent training run.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub(crate) fn set_epoch(&mut self, epoch: usize) {
        self.epoch = epoch;
    }

    /// Total number of weights, biases included.
    pub fn num_weights(&self) -> usize {
        self.layers.iter().map(Layer::num_weights).sum()
    }

    /// Flat weight vector in layer, unit, weight-index order (bias first per unit).
    pub fn weights(&self) -> Vec<f64> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights().iter().copied())
            .collect()
    }

    /// Install an explicit flat weight vector, or randomise when `None`.
    /// Stored momentum is cleared in both cases.
    pub fn set_weights(&mut self, weights: Option<&[f64]>) -> Result<()> {
        match weights {
            Some(weights) => {
                let expected = self.num_weights();
                if weights.len() != expected {
                    return Err(Error::WeightCount {
                        expected,
                        actual: weights.len(),
                    });
                }
                let mut offset = 0;
                for layer in &mut self.layers {
                    let count = layer.num_weights();
                    layer.set_weights(&weights[offset..offset + count]);
                    offset += count;
                }
            }
            None => self.set_weights_with_rng(&mut thread_rng()),
        }
        Ok(())
    }

    pub fn set_weights_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for layer in &mut self.layers {
            layer.randomize_weights(rng);
        }
    }

    /// Forward pass over `inputs`; returns the output layer's values.
    pub fn predict(&mut self, inputs: ArrayView1<f64>) -> Array1<f64> {
        self.forward(inputs);
        self.output_layer().outputs().to_owned()
    }

    /// Run the forward pass on `record` and store its outputs and errors.
    pub fn evaluate(&mut self, record: &mut DataRecord) {
        self.forward(record.inputs());
        let outputs = self.output_layer().outputs();
        record.record_outputs(outputs);
    }

    /// Back-propagate the errors of `record` and update every weight.
    ///
    /// `record` must have just been evaluated by this network: the deltas are
    /// built from the unit outputs cached by that evaluation.
    pub fn adapt(&mut self, record: &DataRecord) {
        assert_eq!(
            record.inputs().len(),
            self.input_width,
            "record has {} inputs, network expects {}",
            record.inputs().len(),
            self.input_width
        );
        assert_eq!(
            record.errors().len(),
            self.num_outputs(),
            "record has {} errors, network has {} outputs",
            record.errors().len(),
            self.num_outputs()
        );

        // Deltas, last layer to first. Each layer's signal comes from the
        // deltas of the layer after it, so this order is fixed.
        let last = self.layers.len() - 1;
        self.layers[last].compute_deltas(record.errors());
        for index in (0..last).rev() {
            let signal = self.layers[index + 1].back_signal();
            self.layers[index].compute_deltas(signal.view());
        }

        // Weight updates, first layer to last. Updating layer i never touches
        // the outputs of layer i - 1, which are its inputs here.
        let LearnParameters {
            learning_rate,
            momentum,
            ..
        } = self.params;
        self.layers[0].update_weights(record.inputs(), learning_rate, momentum);
        for index in 1..self.layers.len() {
            let (before, after) = self.layers.split_at_mut(index);
            after[0].update_weights(before[index - 1].outputs(), learning_rate, momentum);
        }
    }

    fn forward(&mut self, inputs: ArrayView1<f64>) {
        assert_eq!(
            inputs.len(),
            self.input_width,
            "record has {} inputs, network expects {}",
            inputs.len(),
            self.input_width
        );

        self.layers[0].forward(inputs);
        for index in 1..self.layers.len() {
            let (before, after) = self.layers.split_at_mut(index);
            after[0].forward(before[index - 1].outputs());
        }
    }

    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }
}
