use ndarray::{Array1, ArrayView1};

use crate::error::{Error, Result};
use crate::metrics;
use crate::scale::ScaleBounds;

/// Inputs and targets in network scale, plus the outputs and errors written by
/// the most recent `Network::evaluate` on the record.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    inputs: Array1<f64>,
    targets: Array1<f64>,
    outputs: Array1<f64>,
    errors: Array1<f64>,
}

impl DataRecord {
    pub fn new(inputs: Array1<f64>, targets: Array1<f64>) -> Self {
        let outputs = Array1::zeros(targets.len());
        let errors = Array1::zeros(targets.len());
        Self {
            inputs,
            targets,
            outputs,
            errors,
        }
    }

    pub fn inputs(&self) -> ArrayView1<f64> {
        self.inputs.view()
    }

    pub fn targets(&self) -> ArrayView1<f64> {
        self.targets.view()
    }

    pub fn outputs(&self) -> ArrayView1<f64> {
        self.outputs.view()
    }

    /// `targets - outputs` as of the last evaluation.
    pub fn errors(&self) -> ArrayView1<f64> {
        self.errors.view()
    }

    /// Store network outputs and recompute the errors against the targets.
    pub(crate) fn record_outputs(&mut self, outputs: ArrayView1<f64>) {
        assert_eq!(
            outputs.len(),
            self.targets.len(),
            "network produced {} outputs, record has {} targets",
            outputs.len(),
            self.targets.len()
        );
        self.outputs.assign(&outputs);
        self.errors = &self.targets - &self.outputs;
    }
}

/// Named, ordered collection of records with a common shape.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    records: Vec<DataRecord>,
    num_inputs: usize,
    num_outputs: usize,
    bounds: Option<ScaleBounds>,
    mean_squared_errors: Array1<f64>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, num_inputs: usize, num_outputs: usize) -> Result<Self> {
        if num_inputs == 0 || num_outputs == 0 {
            return Err(Error::Format(format!(
                "dataset needs at least one input and one output, got {num_inputs} and {num_outputs}"
            )));
        }
        Ok(Self {
            name: name.into(),
            records: Vec::new(),
            num_inputs,
            num_outputs,
            bounds: None,
            mean_squared_errors: Array1::zeros(num_outputs),
        })
    }

    /// Build a dataset from already normalised rows.
    pub fn from_rows(
        name: impl Into<String>,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
    ) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::Format(format!(
                "{} input rows but {} target rows",
                inputs.len(),
                targets.len()
            )));
        }
        let num_inputs = inputs.first().map_or(0, Vec::len);
        let num_outputs = targets.first().map_or(0, Vec::len);

        let mut dataset = Dataset::new(name, num_inputs, num_outputs)?;
        for (x, y) in inputs.iter().zip(targets) {
            dataset.push(Array1::from(x.clone()), Array1::from(y.clone()))?;
        }
        Ok(dataset)
    }

    pub fn with_bounds(mut self, bounds: ScaleBounds) -> Result<Self> {
        if bounds.num_inputs() != self.num_inputs || bounds.num_outputs() != self.num_outputs {
            return Err(Error::Format(format!(
                "bounds cover {} inputs and {} outputs, dataset has {} and {}",
                bounds.num_inputs(),
                bounds.num_outputs(),
                self.num_inputs,
                self.num_outputs
            )));
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    pub fn push(&mut self, inputs: Array1<f64>, targets: Array1<f64>) -> Result<()> {
        if inputs.len() != self.num_inputs || targets.len() != self.num_outputs {
            return Err(Error::Format(format!(
                "record {} has {} inputs and {} targets, expected {} and {}",
                self.records.len(),
                inputs.len(),
                targets.len(),
                self.num_inputs,
                self.num_outputs
            )));
        }
        self.records.push(DataRecord::new(inputs, targets));
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    pub fn bounds(&self) -> Option<&ScaleBounds> {
        self.bounds.as_ref()
    }

    pub fn records(&self) -> &[DataRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [DataRecord] {
        &mut self.records
    }

    /// Per-channel mean squared error over the records' current errors.
    ///
    /// Inference is not re-run: every record must have been evaluated by the
    /// network of interest beforehand.
    pub fn mean_squared_error(&mut self) -> ArrayView1<f64> {
        self.mean_squared_errors = metrics::mean_squared_error(&self.records, self.num_outputs);
        self.mean_squared_errors.view()
    }

    /// Sum of [`Dataset::mean_squared_error`] over all channels.
    pub fn total_error(&self) -> f64 {
        metrics::total_error(&self.records, self.num_outputs)
    }
}
