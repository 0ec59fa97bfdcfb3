use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Review not found: id={0}")]
    ReviewNotFound(i64),

    #[error("Branch rule not found: pattern={0}")]
    RuleNotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;
