use thiserror::Error;

use crate::transport::TransportError;

/// Errors raised while building, addressing or flushing the tree.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Construction parameters don't describe a valid tree
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A position (flat index, grid row or grid column) outside `0..limit`
    #[error("Index {index} out of range (0..{limit})")]
    IndexOutOfRange { index: usize, limit: usize },

    /// A range with a step of zero
    #[error("Range step must be at least 1")]
    ZeroStep,

    /// A per-LED color sequence doesn't match the number of addressed LEDs
    #[error("Expected {expected} colors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A color channel above 255
    #[error("Channel value {0} out of range (0..=255)")]
    ChannelRange(u32),

    /// A brightness level outside `0..=31`
    #[error("Brightness {0} out of range (0..=31)")]
    BrightnessRange(u32),

    /// A channel slice that is neither `[r, g, b]` nor `[brightness, r, g, b]`
    #[error("Color must have 3 or 4 channels, got {0}")]
    ColorLength(usize),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, TreeError>;
