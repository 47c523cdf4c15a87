use thiserror::Error;

use crate::sim::BallId;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Errors raised by the sandbox.
///
/// The simulation itself degrades silently (unknown boundary modes clamp, empty
/// spit requests do nothing); only broken creation contracts and bad config end up here.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Invalid creation parameter (non-positive or non-finite radius/mass).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Explicit id is already live in the world or its inventory.
    #[error("ball id {0} is already in use")]
    DuplicateId(BallId),

    /// Config or settings JSON failed to parse.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Settings file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
