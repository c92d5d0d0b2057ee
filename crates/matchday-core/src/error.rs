use thiserror::Error;

/// Core-level errors. Subsystems carry their own error enums; this one covers
/// configuration problems that surface before any subsystem starts.
#[derive(Debug, Error)]
pub enum MatchdayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type Result<T> = std::result::Result<T, MatchdayError>;
