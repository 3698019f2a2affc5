use chrono::{DateTime, Utc};

use crate::model::ids::{QuizId, RecordId};

/// A quiz result as recorded by the server. Never mutated by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedQuizRecord {
    pub id: RecordId,
    pub quiz_id: QuizId,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
}

impl CompletedQuizRecord {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn is_for(&self, quiz_id: QuizId) -> bool {
        self.quiz_id == quiz_id
    }
}

/// Most recent completed record for a quiz, if any.
#[must_use]
pub fn latest_completed(
    records: &[CompletedQuizRecord],
    quiz_id: QuizId,
) -> Option<&CompletedQuizRecord> {
    records
        .iter()
        .filter(|r| r.is_completed() && r.is_for(quiz_id))
        .max_by_key(|r| r.created_at)
}
