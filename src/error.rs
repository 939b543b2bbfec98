/// Errors produced while building a network or reading its collaborators' files.
///
/// A single record of the wrong width is a programming error and panics at the
/// call site; whole datasets are checked with `Network::check_dataset`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No layers were given.
    #[error("network must have at least one layer")]
    EmptyTopology,

    /// The external input width is zero.
    #[error("input width must be at least 1")]
    ZeroInputWidth,

    /// A layer was declared with no units.
    #[error("layer {0} must have at least one unit")]
    ZeroLayerSize(usize),

    #[error("activation `{0}` is not recognised")]
    UnknownActivation(String),

    #[error("learning method `{0}` is not recognised")]
    UnknownLearningMethod(String),

    /// A recognised learning method that this crate does not implement.
    #[error("learning method `{0}` is not implemented")]
    UnsupportedLearningMethod(&'static str),

    /// A flat weight vector does not fit the topology.
    #[error("weight count mismatch: expected {expected}, got {actual}")]
    WeightCount { expected: usize, actual: usize },

    /// A dataset whose widths do not fit the network it is run through.
    #[error(
        "dataset `{name}` has {inputs} inputs and {outputs} outputs, \
         network expects {expected_inputs} and {expected_outputs}"
    )]
    DatasetShape {
        name: String,
        inputs: usize,
        outputs: usize,
        expected_inputs: usize,
        expected_outputs: usize,
    },

    /// A data or weight file is structurally malformed.
    #[error("malformed file: {0}")]
    Format(String),

    #[error(transparent)]
    Parse(#[from] std::num::ParseFloatError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
