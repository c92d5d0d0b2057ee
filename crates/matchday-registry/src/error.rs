use thiserror::Error;

/// Registry-layer errors. Kept separate from the core error so callers can
/// decide whether a failed registry read is fatal for their operation.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
