//! Contract for the remote quiz API plus its HTTP adapter.

use async_trait::async_trait;
use serde::Serialize;

use najah_core::model::{
    CompletedQuizRecord, CorrectionResult, QuestionId, QuizAssignment, QuizId, QuizQuestion,
    UserId,
};

use crate::error::ApiError;

mod dto;
mod http;

pub use http::HttpQuizApi;

/// One answer as sent to the scoring endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub answer: String,
}

#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Quizzes assigned to a student, in server order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or an unexpected response shape.
    async fn list_assignments(&self, student: UserId) -> Result<Vec<QuizAssignment>, ApiError>;

    /// Quiz results recorded for a student, in server order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or an unexpected response shape.
    async fn list_results(&self, student: UserId) -> Result<Vec<CompletedQuizRecord>, ApiError>;

    /// Start a quiz and fetch its questions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or an unexpected response shape.
    async fn start_quiz(&self, quiz: QuizId) -> Result<Vec<QuizQuestion>, ApiError>;

    /// Submit answers and receive the correction.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or an unexpected response shape.
    async fn submit_quiz(
        &self,
        quiz: QuizId,
        answers: &[SubmittedAnswer],
    ) -> Result<CorrectionResult, ApiError>;
}
