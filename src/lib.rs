//! Feed-forward multilayer perceptron trained by online back-propagation with momentum.
//!
//! ```
//! use bprop::{Activation, Dataset, LearnParameters, NetworkBuilder, StopReason};
//!
//! # fn main() -> bprop::Result<()> {
//! let mut train = Dataset::from_rows(
//!     "and",
//!     &[vec![0.1, 0.1], vec![0.1, 0.9], vec![0.9, 0.1], vec![0.9, 0.9]],
//!     &[vec![0.1], vec![0.1], vec![0.1], vec![0.9]],
//! )?;
//! let mut net = NetworkBuilder::new(2)
//!     .layers(&[3, 1])
//!     .activation(Activation::Logistic)
//!     .learn_parameters(LearnParameters {
//!         epoch_max: 50,
//!         learning_rate: 0.5,
//!         momentum: 0.5,
//!     })
//!     .build_with_seed(0)?;
//! let report = net.train(&mut train, None);
//! assert_eq!(StopReason::MaxEpochsReached, report.stop_reason);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod data;
pub mod error;
pub mod file;
pub mod layer;
pub mod metrics;
pub mod network;
pub mod report;
pub mod scale;
pub mod train;

pub use activation::Activation;
pub use data::{DataRecord, Dataset};
pub use error::{Error, Result};
pub use layer::{Layer, Unit};
pub use network::{LearnParameters, LearningMethod, Network, NetworkBuilder};
pub use report::ReportMode;
pub use scale::{scale, ScaleBounds, ScaleDirection};
pub use train::{StopReason, TrainReport};

#[macro_export]
macro_rules! assert_rel_eq_arr1 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
}

#[macro_export]
macro_rules! assert_rel_eq_arr2 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
}
