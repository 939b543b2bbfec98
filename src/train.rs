use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::network::Network;

/// Epoch index after which the validation checkpoints start.
const WARMUP_EPOCHS: usize = 149;
/// Epochs between two validation checkpoints.
const CHECK_INTERVAL: usize = 10;
/// Checkpoint sum the first real checkpoint is compared against.
const INITIAL_CHECKPOINT: f64 = 1.0e7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxEpochsReached,
    /// The summed validation error of a checkpoint window did not decrease.
    EarlyStoppedOnValidation,
}

/// Outcome of [`Network::train`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    pub stop_reason: StopReason,
    /// Completed epochs. On an early stop this counts the epoch the stop was
    /// decided in, so it is one more than that epoch's zero-based index.
    pub epochs: usize,
    pub training_error: f64,
    pub validation_error: Option<f64>,
}

impl Network {
    /// Check that `data` has this network's input and output widths.
    pub fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.num_inputs() != self.input_width() || data.num_outputs() != self.num_outputs() {
            return Err(Error::DatasetShape {
                name: data.name().to_string(),
                inputs: data.num_inputs(),
                outputs: data.num_outputs(),
                expected_inputs: self.input_width(),
                expected_outputs: self.num_outputs(),
            });
        }
        Ok(())
    }

    /// Evaluate every record of `data` without adapting.
    pub fn run_once(&mut self, data: &mut Dataset) {
        for record in data.records_mut() {
            self.evaluate(record);
        }
    }

    /// One epoch of online learning: evaluate then adapt each record in order.
    pub fn train_once(&mut self, data: &mut Dataset) {
        for record in data.records_mut() {
            self.evaluate(record);
            self.adapt(record);
        }
    }

    /// Train for at most `epoch_max` epochs.
    ///
    /// With a validation set, the validation error is summed every epoch and,
    /// past epoch 149, compared every 10 epochs with the previous window's sum:
    /// training stops as soon as a window is not better than the one before.
    pub fn train(
        &mut self,
        training: &mut Dataset,
        mut validation: Option<&mut Dataset>,
    ) -> TrainReport {
        let epoch_max = self.learn_parameters().epoch_max;
        let mut window_sum = 0.0;
        let mut previous_window = INITIAL_CHECKPOINT;
        let mut stop_reason = StopReason::MaxEpochsReached;
        let mut epochs = 0;

        log::info!(
            "training on `{}` ({} records) for at most {} epochs",
            training.name(),
            training.len(),
            epoch_max
        );

        for epoch in 0..epoch_max {
            self.train_once(training);
            epochs = epoch + 1;
            self.set_epoch(epochs);

            let Some(validation) = validation.as_deref_mut() else {
                log::debug!("epoch {epoch}");
                continue;
            };

            self.run_once(validation);
            let error = validation.total_error();
            window_sum += error;
            log::debug!("epoch {epoch}: validation error {error:.6}");

            if epoch > WARMUP_EPOCHS && epoch % CHECK_INTERVAL == 0 {
                if window_sum >= previous_window {
                    log::info!(
                        "validation error stopped improving at epoch {epoch}: {window_sum:.6} >= {previous_window:.6}"
                    );
                    stop_reason = StopReason::EarlyStoppedOnValidation;
                    break;
                }
                previous_window = window_sum;
                window_sum = 0.0;
            }
        }

        let training_error = training.total_error();
        let validation_error = validation.map(|v| v.total_error());
        log::info!(
            "stopped after {epochs} epochs ({stop_reason:?}), training error {training_error:.6}"
        );

        TrainReport {
            stop_reason,
            epochs,
            training_error,
            validation_error,
        }
    }
}
