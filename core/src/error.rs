use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcadeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid coin amount: {amount}")]
    InvalidAmount { amount: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ArcadeResult<T> = Result<T, ArcadeError>;
