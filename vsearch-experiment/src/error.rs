use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the experiment crate.
pub type Result<T> = StdResult<T, Error>;

/// Rejected configuration, raised before any trial is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("length of keys ({keys}) and possible orientations ({orientations}) must be equal")]
    KeyOrientationMismatch { keys: usize, orientations: usize },

    #[error("at least one orientation is required")]
    NoOrientations,

    #[error("at least one set size is required")]
    NoSetSizes,

    #[error("set sizes must be positive")]
    ZeroSetSize,

    #[error("trials per block ({trials_per_block}) must be divisible by the number of set sizes ({set_sizes})")]
    UnevenBlock {
        trials_per_block: usize,
        set_sizes: usize,
    },

    #[error("number of blocks must be positive")]
    NoBlocks,

    #[error("{name} must be finite, non-negative and small enough to span, got {value}")]
    InvalidDistance { name: &'static str, value: f64 },

    #[error("max per quadrant must be at least 1")]
    ZeroQuadrantCap,

    #[error("max per quadrant {cap} cannot hold set size {set_size} across four quadrants")]
    QuadrantCapTooSmall { cap: usize, set_size: usize },

    #[error("{role} key {key:?} is also a response key")]
    ReservedKey { role: &'static str, key: String },

    #[error("quit and continue keys must differ, both are {key:?}")]
    QuitIsContinue { key: String },
}

/// Failure to place stimuli under the distance and quadrant constraints.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error(
        "cannot generate locations with given values: placed {accepted} of {set_size} after {attempts} attempts"
    )]
    Exhausted {
        set_size: usize,
        accepted: usize,
        attempts: usize,
    },

    #[error("a display needs at least one item to hold the target")]
    EmptyDisplay,
}

/// Unified error type for the experiment engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("sampling error: {0}")]
    Sampling(#[from] SamplingError),

    #[error("failed to serialize trial: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failure reported by a renderer, response source or data sink.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}
