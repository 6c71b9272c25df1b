use crate::types::{FactoryId, InstanceId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizchainError>;

#[derive(Error, Debug)]
pub enum QuizchainError {
    #[error("instance is already initialized")]
    AlreadyInitialized,

    #[error("a winner already exists")]
    AlreadyResolved,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("deployment failed: {0}")]
    Deployment(String),

    #[error("index {index} out of range for {count} instances")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("unknown instance handle: {id}")]
    UnknownInstance { id: InstanceId },

    #[error("unknown factory handle: {id}")]
    UnknownFactory { id: FactoryId },

    #[error("insufficient funds: need {need} wei, have {available} wei")]
    InsufficientFunds { need: u64, available: u64 },

    #[error("guess calls do not accept attached value")]
    GuessNotPayable,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl QuizchainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn deployment(msg: impl Into<String>) -> Self {
        Self::Deployment(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
