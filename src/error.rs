//! Error types for the duel engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Invalid card format: {0}")]
    InvalidCardFormat(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    /// A rule-violating action. These are rejected with a user-facing log
    /// message and no state change; they are never fatal.
    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DuelError>;
