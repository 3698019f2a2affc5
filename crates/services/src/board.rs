//! The student's assignment list with a resolved status per row.

use std::sync::Arc;

use log::{info, warn};
use najah_core::model::{
    AssignmentId, CompletedQuizRecord, DraftKey, QuizAssignment, UserId, latest_completed,
};
use najah_core::{DisplayStatus, StatusResolver};
use storage::DraftRepository;

use crate::api::QuizApi;
use crate::auth::AuthContext;
use crate::error::SessionError;
use crate::notifications::Notifier;

const MSG_BOARD_FAILED: &str = "Impossible de charger vos quiz.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardFilter {
    #[default]
    All,
    /// Rows that still need the student's attention.
    Pending,
    /// Rows resolved to "complété" or "corrigé".
    Done,
}

impl BoardFilter {
    #[must_use]
    pub fn keeps(self, status: &DisplayStatus) -> bool {
        match self {
            BoardFilter::All => true,
            BoardFilter::Pending => !status.is_done(),
            BoardFilter::Done => status.is_done(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRow {
    pub assignment: QuizAssignment,
    pub status: DisplayStatus,
    /// Most recent completed record for the assignment's quiz.
    pub result: Option<CompletedQuizRecord>,
}

/// Assignments and completed records as fetched for one student.
#[derive(Debug, Clone, Default)]
pub struct AssignmentBoard {
    assignments: Vec<QuizAssignment>,
    records: Vec<CompletedQuizRecord>,
}

impl AssignmentBoard {
    /// Records that are not completed are dropped.
    #[must_use]
    pub fn new(assignments: Vec<QuizAssignment>, records: Vec<CompletedQuizRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(CompletedQuizRecord::is_completed)
            .collect();
        Self {
            assignments,
            records,
        }
    }

    #[must_use]
    pub fn assignments(&self) -> &[QuizAssignment] {
        &self.assignments
    }

    #[must_use]
    pub fn records(&self) -> &[CompletedQuizRecord] {
        &self.records
    }

    #[must_use]
    pub fn find(&self, id: AssignmentId) -> Option<&QuizAssignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// One row per assignment, in server order.
    ///
    /// `open_correction` names the assignment whose correction is currently
    /// held by an open session.
    #[must_use]
    pub fn rows(
        &self,
        drafts: &DraftRepository,
        user: UserId,
        open_correction: Option<AssignmentId>,
    ) -> Vec<AssignmentRow> {
        self.rows_filtered(BoardFilter::All, drafts, user, open_correction)
    }

    #[must_use]
    pub fn rows_filtered(
        &self,
        filter: BoardFilter,
        drafts: &DraftRepository,
        user: UserId,
        open_correction: Option<AssignmentId>,
    ) -> Vec<AssignmentRow> {
        let resolver = StatusResolver::new(&self.records).with_correction(open_correction);
        self.assignments
            .iter()
            .filter_map(|assignment| {
                let has_draft = drafts.exists(&DraftKey::new(assignment.quiz_id, user));
                let status = resolver.resolve(assignment, has_draft);
                filter.keeps(&status).then(|| AssignmentRow {
                    assignment: assignment.clone(),
                    result: latest_completed(&self.records, assignment.quiz_id).cloned(),
                    status,
                })
            })
            .collect()
    }
}

/// Loads the assignment board for the current student.
#[derive(Clone)]
pub struct BoardService {
    auth: AuthContext,
    api: Arc<dyn QuizApi>,
    notifier: Notifier,
}

impl BoardService {
    #[must_use]
    pub fn new(auth: AuthContext, api: Arc<dyn QuizApi>, notifier: Notifier) -> Self {
        Self {
            auth,
            api,
            notifier,
        }
    }

    /// Fetch assignments and results concurrently.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::FetchFailed` if either request fails.
    pub async fn load(&self) -> Result<AssignmentBoard, SessionError> {
        let student = self.auth.user_id();
        let fetched = tokio::try_join!(
            self.api.list_assignments(student),
            self.api.list_results(student)
        );
        match fetched {
            Ok((assignments, records)) => {
                let board = AssignmentBoard::new(assignments, records);
                info!(
                    "loaded {} assignments and {} completed records for {student}",
                    board.assignments().len(),
                    board.records().len()
                );
                Ok(board)
            }
            Err(err) => {
                warn!("failed to load assignment board for {student}: {err}");
                self.notifier.error(MSG_BOARD_FAILED);
                Err(SessionError::FetchFailed(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use najah_core::model::{AnswerSet, QuestionId, QuizId, RecordId};
    use najah_core::time::fixed_now;
    use storage::InMemoryStore;

    fn record(id: u64, quiz: u64, percentage: f64, completed: bool) -> CompletedQuizRecord {
        CompletedQuizRecord {
            id: RecordId::new(id),
            quiz_id: QuizId::new(quiz),
            score: percentage / 5.0,
            max_score: 20.0,
            percentage,
            created_at: fixed_now(),
            completed,
        }
    }

    fn board() -> AssignmentBoard {
        AssignmentBoard::new(
            vec![
                QuizAssignment::new(AssignmentId::new(1), QuizId::new(10), "Fractions"),
                QuizAssignment::new(AssignmentId::new(2), QuizId::new(20), "Conjugaison"),
                QuizAssignment::new(AssignmentId::new(3), QuizId::new(30), "Histoire")
                    .with_server_status("assigné"),
            ],
            vec![record(1, 10, 85.0, true), record(2, 20, 40.0, false)],
        )
    }

    #[test]
    fn incomplete_records_are_dropped() {
        assert_eq!(board().records().len(), 1);
    }

    #[test]
    fn rows_resolve_each_status_source() {
        let drafts = DraftRepository::new(Arc::new(InMemoryStore::new()));
        let user = UserId::new(5);
        let mut answers = AnswerSet::new();
        answers.set(QuestionId::new(1), "a");
        drafts
            .save(&DraftKey::new(QuizId::new(20), user), &answers)
            .unwrap();

        let rows = board().rows(&drafts, user, None);
        let labels: Vec<_> = rows.iter().map(|r| r.status.label().to_string()).collect();
        assert_eq!(labels, vec!["complété", "en cours", "assigné"]);
        assert_eq!(rows[0].result.as_ref().map(|r| r.percentage), Some(85.0));
        assert!(rows[1].result.is_none());
    }

    #[test]
    fn filters_split_done_from_pending() {
        let drafts = DraftRepository::new(Arc::new(InMemoryStore::new()));
        let user = UserId::new(5);
        let board = board();

        let done = board.rows_filtered(BoardFilter::Done, &drafts, user, Some(AssignmentId::new(2)));
        let ids: Vec<_> = done.iter().map(|r| r.assignment.id).collect();
        assert_eq!(ids, vec![AssignmentId::new(1), AssignmentId::new(2)]);
        assert_eq!(done[1].status, DisplayStatus::Corrected);

        let pending = board.rows_filtered(BoardFilter::Pending, &drafts, user, None);
        assert_eq!(pending.len(), 2);
    }
}
