use thiserror::Error;

/// Errors surfaced by the trajectory core.
///
/// All variants are fatal for the pipeline that raised them; there is no
/// retry. Independent pipelines (e.g. the GPS projection) are unaffected by
/// a failure in another one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    /// Companion batches that must be index-aligned differ in length.
    #[error("companion batches differ in length: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    /// A sample batch has the wrong number of channels.
    #[error("sample batch must have {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// The normalized cutoff `cutoff / (0.5 * sample_rate)` fell outside
    /// the open interval (0, 1), or the filter order was zero.
    #[error("invalid filter design: normalized cutoff {normalized} outside (0, 1)")]
    InvalidFilterDesign { normalized: f64 },

    /// A zero-length sample batch or fix sequence was supplied.
    #[error("empty input: a trajectory needs at least one sample")]
    EmptyInput,

    /// The integration time step must be a positive, finite number.
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),
}

pub type Result<T> = std::result::Result<T, TrajectoryError>;
