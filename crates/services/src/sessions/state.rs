use std::fmt;

use log::{debug, warn};
use najah_core::model::{
    AnswerSet, AssignmentId, CompletedQuizRecord, CorrectionResult, CursorAction, DraftKey,
    QuestionCursor, QuestionId, QuizAssignment, QuizQuestion, UserId,
};
use najah_core::{DisplayStatus, StatusResolver};

use super::progress::SessionProgress;
use crate::api::SubmittedAnswer;
use crate::error::SessionError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Which request failed when a session sits in `SessionPhase::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFailure {
    Fetch,
    Submission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    LoadingQuestions,
    Answering,
    Submitting,
    /// Terminal for this session.
    Corrected,
    Error(SessionFailure),
}

impl SessionPhase {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::LoadingQuestions => "loading_questions",
            SessionPhase::Answering => "answering",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Corrected => "corrected",
            SessionPhase::Error(_) => "error",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//
// ─── TICKETS ───────────────────────────────────────────────────────────────────
//

/// Proof that a request was issued by the current incarnation of a session.
///
/// Results handed back with an outdated ticket are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct RequestTicket {
    epoch: u64,
}

/// Ticket for an in-flight submission, carrying the answers to send.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SubmitTicket {
    request: RequestTicket,
    answers: Vec<SubmittedAnswer>,
}

impl SubmitTicket {
    pub fn request(&self) -> RequestTicket {
        self.request
    }

    #[must_use]
    pub fn answers(&self) -> &[SubmittedAnswer] {
        &self.answers
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state of taking one quiz assignment.
///
/// Pure and synchronous: requests are represented by tickets handed out when a
/// phase begins and returned when its result arrives. Persistence and network
/// calls live in `SessionController`.
#[derive(Debug, Clone)]
pub struct QuizSession {
    assignment: QuizAssignment,
    draft_key: DraftKey,
    phase: SessionPhase,
    questions: Vec<QuizQuestion>,
    answers: AnswerSet,
    cursor: QuestionCursor,
    correction: Option<CorrectionResult>,
    epoch: u64,
}

impl QuizSession {
    #[must_use]
    pub fn new(assignment: QuizAssignment, user_id: UserId) -> Self {
        let draft_key = DraftKey::new(assignment.quiz_id, user_id);
        Self {
            assignment,
            draft_key,
            phase: SessionPhase::Idle,
            questions: Vec::new(),
            answers: AnswerSet::new(),
            cursor: QuestionCursor::new(0),
            correction: None,
            epoch: 0,
        }
    }

    #[must_use]
    pub fn assignment(&self) -> &QuizAssignment {
        &self.assignment
    }

    #[must_use]
    pub fn draft_key(&self) -> &DraftKey {
        &self.draft_key
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn correction(&self) -> Option<&CorrectionResult> {
        self.correction.as_ref()
    }

    /// The assignment whose correction this session holds, if any.
    #[must_use]
    pub fn corrected_assignment(&self) -> Option<AssignmentId> {
        self.correction.as_ref().map(|_| self.assignment.id)
    }

    #[must_use]
    pub fn cursor(&self) -> QuestionCursor {
        self.cursor
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.cursor.index())
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answers.answered_among(&self.questions),
            current: self.cursor.index(),
            is_corrected: self.phase == SessionPhase::Corrected,
        }
    }

    /// Display status of this session's assignment.
    #[must_use]
    pub fn status(&self, records: &[CompletedQuizRecord], has_draft: bool) -> DisplayStatus {
        StatusResolver::new(records)
            .with_correction(self.corrected_assignment())
            .resolve(&self.assignment, has_draft)
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// Start (or restart) loading questions.
    ///
    /// Clears any correction, the in-memory answers and the question index.
    /// Restarting while a load is pending supersedes the earlier request.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is idle,
    /// in error, or already loading.
    pub fn begin_loading(&mut self) -> Result<RequestTicket, SessionError> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Error(_) | SessionPhase::LoadingQuestions => {}
            other => return Err(invalid("start the quiz", other)),
        }
        self.correction = None;
        self.answers.clear();
        self.questions.clear();
        self.cursor = QuestionCursor::new(0);
        self.transition(SessionPhase::LoadingQuestions);
        Ok(self.issue_ticket())
    }

    /// Questions arrived. `restored` is the persisted draft (possibly empty);
    /// entries the loaded quiz cannot accept are dropped.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Stale` for an outdated ticket and
    /// `SessionError::EmptyQuiz` (moving to the error phase) for an empty quiz.
    pub fn questions_loaded(
        &mut self,
        ticket: RequestTicket,
        questions: Vec<QuizQuestion>,
        mut restored: AnswerSet,
    ) -> Result<(), SessionError> {
        self.check_ticket(ticket, SessionPhase::LoadingQuestions)?;
        if questions.is_empty() {
            self.transition(SessionPhase::Error(SessionFailure::Fetch));
            return Err(SessionError::EmptyQuiz);
        }
        let dropped = restored.retain_answerable(&questions);
        if !dropped.is_empty() {
            warn!(
                "discarding {} restored answers for {}: {dropped:?}",
                dropped.len(),
                self.draft_key
            );
        }
        self.cursor = QuestionCursor::new(questions.len());
        self.questions = questions;
        self.answers = restored;
        self.transition(SessionPhase::Answering);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Stale` for an outdated ticket.
    pub fn loading_failed(&mut self, ticket: RequestTicket) -> Result<(), SessionError> {
        self.check_ticket(ticket, SessionPhase::LoadingQuestions)?;
        self.transition(SessionPhase::Error(SessionFailure::Fetch));
        Ok(())
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    /// Record an answer for a question of this quiz.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside the answering phase, `UnknownQuestion`
    /// for a question not in the quiz, and `InvalidChoice` for an unlisted choice.
    pub fn answer(
        &mut self,
        question: QuestionId,
        value: impl Into<String>,
    ) -> Result<&AnswerSet, SessionError> {
        self.require(SessionPhase::Answering, "answer")?;
        let value = value.into();
        let target = self
            .questions
            .iter()
            .find(|q| q.id() == question)
            .ok_or(SessionError::UnknownQuestion(question))?;
        if !target.accepts(&value) {
            return Err(SessionError::InvalidChoice {
                question,
                answer: value,
            });
        }
        self.answers.set(question, value);
        Ok(&self.answers)
    }

    /// Answer the question currently on screen.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::answer`].
    pub fn answer_current(&mut self, value: impl Into<String>) -> Result<&AnswerSet, SessionError> {
        self.require(SessionPhase::Answering, "answer")?;
        let Some(id) = self.current_question().map(QuizQuestion::id) else {
            return Err(invalid("answer", self.phase));
        };
        self.answer(id, value)
    }

    /// Move to the next question. No-op outside the answering phase or on the last question.
    pub fn next(&mut self) -> bool {
        self.phase == SessionPhase::Answering && self.cursor.next()
    }

    /// Move to the previous question. No-op outside the answering phase or on the first question.
    pub fn previous(&mut self) -> bool {
        self.phase == SessionPhase::Answering && self.cursor.previous()
    }

    pub fn jump_to(&mut self, index: usize) {
        if self.phase == SessionPhase::Answering {
            self.cursor.jump_to(index);
        }
    }

    #[must_use]
    pub fn primary_action(&self) -> CursorAction {
        self.cursor.primary_action()
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    /// Freeze the answers for submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyCompleted` when the assignment already
    /// resolves to "corrigé", and `InvalidTransition` outside the answering phase.
    pub fn begin_submit(
        &mut self,
        records: &[CompletedQuizRecord],
    ) -> Result<SubmitTicket, SessionError> {
        if self.status(records, false) == DisplayStatus::Corrected {
            return Err(SessionError::AlreadyCompleted);
        }
        self.require(SessionPhase::Answering, "submit")?;

        let answers = self
            .answers
            .in_question_order(&self.questions)
            .into_iter()
            .map(|(question_id, answer)| SubmittedAnswer {
                question_id,
                answer,
            })
            .collect();
        self.transition(SessionPhase::Submitting);
        Ok(SubmitTicket {
            request: self.issue_ticket(),
            answers,
        })
    }

    /// Scoring succeeded. Clears the in-memory answers and keeps the correction.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Stale` for an outdated ticket.
    pub fn submission_succeeded(
        &mut self,
        ticket: RequestTicket,
        correction: CorrectionResult,
    ) -> Result<&CorrectionResult, SessionError> {
        self.check_ticket(ticket, SessionPhase::Submitting)?;
        self.answers.clear();
        self.transition(SessionPhase::Corrected);
        Ok(&*self.correction.insert(correction))
    }

    /// Scoring failed. Answers are kept so the student can retry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Stale` for an outdated ticket.
    pub fn submission_failed(&mut self, ticket: RequestTicket) -> Result<(), SessionError> {
        self.check_ticket(ticket, SessionPhase::Submitting)?;
        self.transition(SessionPhase::Error(SessionFailure::Submission));
        Ok(())
    }

    //
    // ─── RECOVERY & TEARDOWN ───────────────────────────────────────────────────
    //

    /// Leave the error phase: back to answering when questions are loaded,
    /// otherwise back to idle. Other phases are unchanged.
    pub fn recover(&mut self) -> SessionPhase {
        if let SessionPhase::Error(_) = self.phase {
            let target = if self.questions.is_empty() {
                SessionPhase::Idle
            } else {
                SessionPhase::Answering
            };
            self.transition(target);
        }
        self.phase
    }

    /// Invalidate every outstanding ticket and roll in-flight phases back to
    /// their previous stable phase.
    pub fn close(&mut self) {
        self.epoch += 1;
        match self.phase {
            SessionPhase::LoadingQuestions => self.transition(SessionPhase::Idle),
            SessionPhase::Submitting => self.transition(SessionPhase::Answering),
            _ => {}
        }
    }

    /// Go back to the assignment list. The correction, if any, is kept.
    pub fn return_to_list(&mut self) {
        self.close();
        self.cursor.reset();
        self.transition(SessionPhase::Idle);
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn issue_ticket(&mut self) -> RequestTicket {
        self.epoch += 1;
        RequestTicket { epoch: self.epoch }
    }

    fn check_ticket(&self, ticket: RequestTicket, expected: SessionPhase) -> Result<(), SessionError> {
        if ticket.epoch != self.epoch || self.phase != expected {
            debug!(
                "discarding stale result for {} (phase {})",
                self.assignment.id, self.phase
            );
            return Err(SessionError::Stale);
        }
        Ok(())
    }

    fn require(&self, phase: SessionPhase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(invalid(action, self.phase))
        }
    }

    fn transition(&mut self, to: SessionPhase) {
        if self.phase != to {
            debug!("session {}: {} -> {}", self.assignment.id, self.phase, to);
        }
        self.phase = to;
    }
}

fn invalid(action: &'static str, phase: SessionPhase) -> SessionError {
    SessionError::InvalidTransition {
        action,
        phase: phase.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use najah_core::model::{QuestionKind, QuizId, RecordId};
    use najah_core::time::fixed_now;

    fn assignment() -> QuizAssignment {
        QuizAssignment::new(AssignmentId::new(1), QuizId::new(10), "Géométrie")
    }

    fn questions(n: u64) -> Vec<QuizQuestion> {
        (1..=n)
            .map(|id| {
                QuizQuestion::new(
                    QuestionId::new(id),
                    format!("Question {id}"),
                    QuestionKind::MultipleChoice,
                    vec!["a".into(), "b".into()],
                )
                .unwrap()
            })
            .collect()
    }

    fn correction() -> CorrectionResult {
        CorrectionResult {
            score: 2.0,
            max_score: 3.0,
            percentage: 66.7,
            corrections: vec![],
        }
    }

    fn answering(n: u64) -> QuizSession {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        let ticket = session.begin_loading().unwrap();
        session
            .questions_loaded(ticket, questions(n), AnswerSet::new())
            .unwrap();
        session
    }

    #[test]
    fn happy_path_reaches_corrected() {
        let mut session = answering(2);
        assert_eq!(session.phase(), SessionPhase::Answering);

        session.answer_current("a").unwrap();
        assert!(session.next());
        assert_eq!(session.primary_action(), CursorAction::Submit);
        session.answer_current("b").unwrap();

        let ticket = session.begin_submit(&[]).unwrap();
        assert_eq!(ticket.answers().len(), 2);
        assert_eq!(session.phase(), SessionPhase::Submitting);

        session
            .submission_succeeded(ticket.request(), correction())
            .unwrap();
        assert_eq!(session.phase(), SessionPhase::Corrected);
        assert!(session.answers().is_empty());
        assert_eq!(session.status(&[], false), DisplayStatus::Corrected);
    }

    #[test]
    fn restored_answers_are_visible_after_loading() {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        let ticket = session.begin_loading().unwrap();
        let mut restored = AnswerSet::new();
        restored.set(QuestionId::new(1), "b");
        session
            .questions_loaded(ticket, questions(3), restored.clone())
            .unwrap();

        assert_eq!(session.answers(), &restored);
        assert_eq!(session.progress().answered, 1);
        assert_eq!(session.progress().remaining(), 2);
    }

    #[test]
    fn restored_answers_outside_the_quiz_are_discarded() {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        let ticket = session.begin_loading().unwrap();
        let restored: AnswerSet = [
            (QuestionId::new(1), "zzz".to_string()),
            (QuestionId::new(2), "a".to_string()),
            (QuestionId::new(7), "b".to_string()),
        ]
        .into_iter()
        .collect();
        session
            .questions_loaded(ticket, questions(2), restored)
            .unwrap();

        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers().get(QuestionId::new(2)), Some("a"));
        assert_eq!(session.begin_submit(&[]).unwrap().answers().len(), 1);
    }

    #[test]
    fn empty_quiz_moves_to_error() {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        let ticket = session.begin_loading().unwrap();
        let err = session
            .questions_loaded(ticket, vec![], AnswerSet::new())
            .unwrap_err();
        assert!(matches!(err, SessionError::EmptyQuiz));
        assert_eq!(session.phase(), SessionPhase::Error(SessionFailure::Fetch));
        assert_eq!(session.recover(), SessionPhase::Idle);
    }

    #[test]
    fn invalid_answers_leave_the_set_untouched() {
        let mut session = answering(2);
        assert!(matches!(
            session.answer(QuestionId::new(99), "a"),
            Err(SessionError::UnknownQuestion(_))
        ));
        assert!(matches!(
            session.answer(QuestionId::new(1), "z"),
            Err(SessionError::InvalidChoice { .. })
        ));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn cannot_answer_or_submit_before_loading() {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        assert!(matches!(
            session.answer(QuestionId::new(1), "a"),
            Err(SessionError::InvalidTransition { phase: "idle", .. })
        ));
        assert!(matches!(
            session.begin_submit(&[]),
            Err(SessionError::InvalidTransition { action: "submit", .. })
        ));
    }

    #[test]
    fn resubmitting_a_corrected_session_is_refused() {
        let mut session = answering(1);
        session.answer_current("a").unwrap();
        let ticket = session.begin_submit(&[]).unwrap();
        session
            .submission_succeeded(ticket.request(), correction())
            .unwrap();

        assert!(matches!(
            session.begin_submit(&[]),
            Err(SessionError::AlreadyCompleted)
        ));
        assert_eq!(session.phase(), SessionPhase::Corrected);
    }

    #[test]
    fn server_record_takes_precedence_over_local_correction() {
        let mut session = answering(1);
        session.answer_current("a").unwrap();
        let ticket = session.begin_submit(&[]).unwrap();
        session
            .submission_succeeded(ticket.request(), correction())
            .unwrap();

        let records = vec![CompletedQuizRecord {
            id: RecordId::new(1),
            quiz_id: QuizId::new(10),
            score: 2.0,
            max_score: 3.0,
            percentage: 66.7,
            created_at: fixed_now(),
            completed: true,
        }];
        assert_eq!(session.status(&records, true), DisplayStatus::Completed);
    }

    #[test]
    fn failed_submission_keeps_answers_and_recovers() {
        let mut session = answering(2);
        session.answer(QuestionId::new(1), "a").unwrap();
        let ticket = session.begin_submit(&[]).unwrap();
        session.submission_failed(ticket.request()).unwrap();

        assert_eq!(
            session.phase(),
            SessionPhase::Error(SessionFailure::Submission)
        );
        assert_eq!(session.answers().get(QuestionId::new(1)), Some("a"));
        assert_eq!(session.recover(), SessionPhase::Answering);
        assert!(session.begin_submit(&[]).is_ok());
    }

    #[test]
    fn results_after_close_are_discarded() {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        let ticket = session.begin_loading().unwrap();
        session.close();
        assert_eq!(session.phase(), SessionPhase::Idle);

        let err = session
            .questions_loaded(ticket, questions(2), AnswerSet::new())
            .unwrap_err();
        assert!(matches!(err, SessionError::Stale));
        assert!(session.questions().is_empty());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn closing_mid_submission_rolls_back_to_answering() {
        let mut session = answering(1);
        session.answer_current("b").unwrap();
        let ticket = session.begin_submit(&[]).unwrap();
        session.close();

        assert_eq!(session.phase(), SessionPhase::Answering);
        assert!(matches!(
            session.submission_succeeded(ticket.request(), correction()),
            Err(SessionError::Stale)
        ));
        assert!(session.correction().is_none());
        assert_eq!(session.answers().get(QuestionId::new(1)), Some("b"));
    }

    #[test]
    fn restarting_a_load_supersedes_the_first_request() {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        let first = session.begin_loading().unwrap();
        let second = session.begin_loading().unwrap();

        assert!(matches!(
            session.questions_loaded(first, questions(1), AnswerSet::new()),
            Err(SessionError::Stale)
        ));
        session
            .questions_loaded(second, questions(2), AnswerSet::new())
            .unwrap();
        assert_eq!(session.questions().len(), 2);
    }

    #[test]
    fn return_to_list_keeps_correction_until_restart() {
        let mut session = answering(1);
        session.answer_current("a").unwrap();
        let ticket = session.begin_submit(&[]).unwrap();
        session
            .submission_succeeded(ticket.request(), correction())
            .unwrap();

        session.return_to_list();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.status(&[], false), DisplayStatus::Corrected);

        let _ticket = session.begin_loading().unwrap();
        assert!(session.correction().is_none());
        assert_eq!(session.cursor().index(), 0);
    }

    #[test]
    fn navigation_is_ignored_outside_answering() {
        let mut session = QuizSession::new(assignment(), UserId::new(5));
        assert!(!session.next());
        assert!(!session.previous());
        session.jump_to(3);
        assert_eq!(session.cursor().index(), 0);
    }
}
