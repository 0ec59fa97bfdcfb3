use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Invalid review status: {0}")]
    InvalidStatus(String),

    #[error("Review is not pending (current status: {0})")]
    NotPending(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
