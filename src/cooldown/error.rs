use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration {0:?}: missing number before unit")]
    MissingNumber(String),

    #[error("invalid duration {0:?}: missing unit after number")]
    MissingUnit(String),

    #[error("invalid duration {input:?}: unknown unit {unit:?}")]
    UnknownUnit { input: String, unit: String },

    #[error("invalid duration {0:?}: malformed number")]
    InvalidNumber(String),

    #[error("invalid duration {0:?}: out of range")]
    Overflow(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Status { status: StatusCode, body: Bytes },

    #[error("invalid version metadata: {0}")]
    InvalidMetadata(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CooldownError {
    /// The version exists upstream but is still inside the cooldown window
    #[error("version not found")]
    Hidden,

    #[error("no versions available")]
    NoEligibleVersion,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
