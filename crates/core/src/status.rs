//! Display status of a quiz assignment.
//!
//! The status is never stored. It is recomputed from its source signals every
//! time it is needed so the server record, the in-session correction and the
//! local draft can never disagree with a cached value.

use std::fmt;

use crate::model::{AssignmentId, CompletedQuizRecord, QuizAssignment};

pub const LABEL_COMPLETED: &str = "complété";
pub const LABEL_CORRECTED: &str = "corrigé";
pub const LABEL_IN_PROGRESS: &str = "en cours";
pub const LABEL_NOT_STARTED: &str = "non commencé";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayStatus {
    /// The server holds a completed result for the quiz.
    Completed,
    /// A correction was received in this session but the server has not confirmed it yet.
    Corrected,
    /// A local draft of answers exists.
    InProgress,
    /// Raw status sent by the server.
    Server(String),
    NotStarted,
}

impl DisplayStatus {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            DisplayStatus::Completed => LABEL_COMPLETED,
            DisplayStatus::Corrected => LABEL_CORRECTED,
            DisplayStatus::InProgress => LABEL_IN_PROGRESS,
            DisplayStatus::Server(raw) => raw.as_str(),
            DisplayStatus::NotStarted => LABEL_NOT_STARTED,
        }
    }

    /// True once the student has nothing left to submit.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, DisplayStatus::Completed | DisplayStatus::Corrected)
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves assignment statuses against a fixed set of completed records and
/// the assignment (if any) whose correction is currently held in memory.
#[derive(Debug, Clone, Copy)]
pub struct StatusResolver<'a> {
    records: &'a [CompletedQuizRecord],
    corrected: Option<AssignmentId>,
}

impl<'a> StatusResolver<'a> {
    #[must_use]
    pub fn new(records: &'a [CompletedQuizRecord]) -> Self {
        Self {
            records,
            corrected: None,
        }
    }

    /// Mark the assignment whose correction is held by the open session.
    #[must_use]
    pub fn with_correction(mut self, assignment: Option<AssignmentId>) -> Self {
        self.corrected = assignment;
        self
    }

    /// Resolve the status of one assignment. First match wins:
    ///
    /// 1. completed server record for the quiz
    /// 2. in-memory correction for this assignment
    /// 3. persisted draft (`has_draft`)
    /// 4. server status, or "non commencé"
    #[must_use]
    pub fn resolve(&self, assignment: &QuizAssignment, has_draft: bool) -> DisplayStatus {
        let completed = self
            .records
            .iter()
            .any(|r| r.is_completed() && r.is_for(assignment.quiz_id));
        if completed {
            return DisplayStatus::Completed;
        }

        if self.corrected == Some(assignment.id) {
            return DisplayStatus::Corrected;
        }

        if has_draft {
            return DisplayStatus::InProgress;
        }

        match assignment.server_status() {
            Some(raw) => DisplayStatus::Server(raw.to_string()),
            None => DisplayStatus::NotStarted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuizId, RecordId};
    use crate::time::fixed_now;

    fn assignment(id: u64, quiz: u64) -> QuizAssignment {
        QuizAssignment::new(AssignmentId::new(id), QuizId::new(quiz), format!("Quiz {quiz}"))
    }

    fn record(quiz: u64, completed: bool) -> CompletedQuizRecord {
        CompletedQuizRecord {
            id: RecordId::new(quiz * 100),
            quiz_id: QuizId::new(quiz),
            score: 17.0,
            max_score: 20.0,
            percentage: 85.0,
            created_at: fixed_now(),
            completed,
        }
    }

    #[test]
    fn completed_record_beats_every_other_signal() {
        let records = vec![record(10, true)];
        let a = assignment(1, 10).with_server_status("assigné");
        let resolver = StatusResolver::new(&records).with_correction(Some(a.id));

        for has_draft in [false, true] {
            assert_eq!(resolver.resolve(&a, has_draft), DisplayStatus::Completed);
        }
    }

    #[test]
    fn correction_only_applies_to_the_open_assignment() {
        let a = assignment(1, 10);
        let b = assignment(2, 20);
        let resolver = StatusResolver::new(&[]).with_correction(Some(a.id));

        assert_eq!(resolver.resolve(&a, true), DisplayStatus::Corrected);
        assert_eq!(resolver.resolve(&b, true), DisplayStatus::InProgress);
    }

    #[test]
    fn incomplete_record_does_not_count() {
        let records = vec![record(10, false)];
        let resolver = StatusResolver::new(&records);
        assert_eq!(
            resolver.resolve(&assignment(1, 10), false),
            DisplayStatus::NotStarted
        );
    }

    #[test]
    fn falls_back_to_server_status_then_not_started() {
        let resolver = StatusResolver::new(&[]);
        let with_status = assignment(1, 10).with_server_status("en retard");
        assert_eq!(
            resolver.resolve(&with_status, false),
            DisplayStatus::Server("en retard".into())
        );

        let padded = assignment(3, 30).with_server_status(" en retard\n");
        assert_eq!(
            resolver.resolve(&padded, false).label(),
            " en retard\n"
        );

        let blank = assignment(2, 20).with_server_status("");
        assert_eq!(resolver.resolve(&blank, false), DisplayStatus::NotStarted);
        assert_eq!(resolver.resolve(&blank, false).label(), "non commencé");
    }

    #[test]
    fn draft_beats_server_status() {
        let resolver = StatusResolver::new(&[]);
        let a = assignment(1, 10).with_server_status("assigné");
        assert_eq!(resolver.resolve(&a, true).label(), "en cours");
    }

    #[test]
    fn done_statuses() {
        assert!(DisplayStatus::Completed.is_done());
        assert!(DisplayStatus::Corrected.is_done());
        assert!(!DisplayStatus::InProgress.is_done());
        assert!(!DisplayStatus::Server("assigné".into()).is_done());
    }
}
