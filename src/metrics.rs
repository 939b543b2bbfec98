use ndarray::{Array1, Zip};

use crate::data::DataRecord;

/// Mean squared error of each output channel over `records`: `Σ error² / n`.
///
/// Uses the error vectors left by the last evaluation of each record.
/// `num_outputs` fixes the result width so an empty slice yields zeros.
pub fn mean_squared_error(records: &[DataRecord], num_outputs: usize) -> Array1<f64> {
    let mut sums = Array1::<f64>::zeros(num_outputs);
    if records.is_empty() {
        return sums;
    }

    for record in records {
        Zip::from(&mut sums)
            .and(&record.errors())
            .for_each(|sum, &error| *sum += error.powi(2));
    }
    sums / records.len() as f64
}

/// Sum of the per-channel mean squared errors.
pub fn total_error(records: &[DataRecord], num_outputs: usize) -> f64 {
    mean_squared_error(records, num_outputs).sum()
}
