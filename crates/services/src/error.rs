//! Shared error types for the services crate.

use thiserror::Error;

use najah_core::model::{QuestionError, QuestionId};
use storage::StorageError;

/// Errors emitted by `QuizApi` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("transport error: {0}")]
    Transport(String),
    /// Body did not match the expected response shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::HttpStatus(status)
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Errors emitted while building `ApiConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("timeout must be a positive number of seconds")]
    InvalidTimeout,
}

/// Errors emitted by the quiz session and the assignment board.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("failed to load quiz data: {0}")]
    FetchFailed(#[source] ApiError),
    #[error("quiz has no questions")]
    EmptyQuiz,
    #[error("quiz submission failed: {0}")]
    SubmissionFailed(#[source] ApiError),
    #[error("quiz already completed")]
    AlreadyCompleted,
    #[error("cannot {action} while the session is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("{answer:?} is not a valid choice for question {question}")]
    InvalidChoice { question: QuestionId, answer: String },
    /// A response arrived for a request the session no longer waits for.
    #[error("result arrived for a superseded request")]
    Stale,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
