use thiserror::Error;

/// Fixture feed failures. Both variants are recoverable: the caller logs them
/// and keeps the previously installed schedule for this cycle.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure or non-success HTTP status from the feed.
    #[error("fixture feed unavailable: {0}")]
    Unavailable(String),

    /// The feed answered but the payload could not be decoded.
    #[error("fixture feed payload malformed: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
