use std::sync::Arc;

use log::{debug, info, warn};
use najah_core::DisplayStatus;
use najah_core::model::{CompletedQuizRecord, CorrectionResult, QuestionId, QuizAssignment};
use storage::DraftRepository;

use super::state::QuizSession;
use crate::api::QuizApi;
use crate::auth::AuthContext;
use crate::error::SessionError;
use crate::notifications::Notifier;

const MSG_LOAD_FAILED: &str = "Impossible de charger le quiz.";
const MSG_EMPTY_QUIZ: &str = "Ce quiz ne contient aucune question.";
const MSG_SAVE_FAILED: &str = "Impossible d'enregistrer vos réponses sur cet appareil.";
const MSG_ALREADY_COMPLETED: &str = "Vous avez déjà complété ce quiz.";
const MSG_SUBMIT_FAILED: &str = "Échec de la soumission du quiz. Vos réponses sont conservées.";
const MSG_CLEAR_FAILED: &str =
    "Quiz corrigé, mais vos anciennes réponses n'ont pas pu être effacées de cet appareil.";

/// Drives a `QuizSession` against the remote API and the local draft store.
#[derive(Clone)]
pub struct SessionController {
    auth: AuthContext,
    api: Arc<dyn QuizApi>,
    drafts: DraftRepository,
    notifier: Notifier,
}

impl SessionController {
    #[must_use]
    pub fn new(
        auth: AuthContext,
        api: Arc<dyn QuizApi>,
        drafts: DraftRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            auth,
            api,
            drafts,
            notifier,
        }
    }

    #[must_use]
    pub fn drafts(&self) -> &DraftRepository {
        &self.drafts
    }

    /// A fresh idle session for the current student.
    #[must_use]
    pub fn open(&self, assignment: QuizAssignment) -> QuizSession {
        QuizSession::new(assignment, self.auth.user_id())
    }

    /// Display status of the session's assignment, checking the persisted draft.
    #[must_use]
    pub fn status(&self, session: &QuizSession, records: &[CompletedQuizRecord]) -> DisplayStatus {
        session.status(records, self.drafts.exists(session.draft_key()))
    }

    /// Fetch the questions and restore any persisted draft.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::FetchFailed` or `SessionError::EmptyQuiz`, leaving
    /// the session in the error phase, and `InvalidTransition` when the session
    /// cannot start from its current phase.
    pub async fn start(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        let ticket = session.begin_loading()?;
        let quiz_id = session.assignment().quiz_id;

        match self.api.start_quiz(quiz_id).await {
            Ok(questions) => {
                let restored = self.drafts.restore(session.draft_key());
                let outcome = session.questions_loaded(ticket, questions, restored);
                match &outcome {
                    Ok(()) => info!(
                        "quiz {quiz_id} started with {} questions ({} restored answers)",
                        session.questions().len(),
                        session.answers().len()
                    ),
                    Err(SessionError::EmptyQuiz) => self.notifier.error(MSG_EMPTY_QUIZ),
                    Err(_) => {}
                }
                outcome
            }
            Err(err) => {
                session.loading_failed(ticket)?;
                warn!("failed to start quiz {quiz_id}: {err}");
                self.notifier.error(MSG_LOAD_FAILED);
                Err(SessionError::FetchFailed(err))
            }
        }
    }

    /// Record an answer and persist the draft.
    ///
    /// # Errors
    ///
    /// Validation errors from [`QuizSession::answer`]. A failed draft write is
    /// reported as `SessionError::Storage`; the in-memory answer is kept.
    pub fn answer(
        &self,
        session: &mut QuizSession,
        question: QuestionId,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        session.answer(question, value)?;
        self.persist(session)
    }

    /// Answer the question on screen and persist the draft.
    ///
    /// # Errors
    ///
    /// Same as [`SessionController::answer`].
    pub fn answer_current(
        &self,
        session: &mut QuizSession,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        session.answer_current(value)?;
        self.persist(session)
    }

    /// Submit the current answers for scoring.
    ///
    /// On success the persisted draft is removed. On failure the draft and the
    /// in-memory answers are kept so the student can retry.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyCompleted` without contacting the server
    /// when the assignment already resolves to "corrigé", and
    /// `SessionError::SubmissionFailed` when scoring fails.
    pub async fn submit(
        &self,
        session: &mut QuizSession,
        records: &[CompletedQuizRecord],
    ) -> Result<CorrectionResult, SessionError> {
        let ticket = match session.begin_submit(records) {
            Ok(ticket) => ticket,
            Err(SessionError::AlreadyCompleted) => {
                self.notifier.info(MSG_ALREADY_COMPLETED);
                return Err(SessionError::AlreadyCompleted);
            }
            Err(err) => return Err(err),
        };
        let quiz_id = session.assignment().quiz_id;

        match self.api.submit_quiz(quiz_id, ticket.answers()).await {
            Ok(correction) => {
                let correction = session
                    .submission_succeeded(ticket.request(), correction)?
                    .clone();
                info!(
                    "quiz {quiz_id} corrected: {}/{} ({:.1}%)",
                    correction.score, correction.max_score, correction.percentage
                );
                self.notifier
                    .success(format!("Quiz corrigé : {:.0}%", correction.percentage));
                self.discard_draft(session);
                Ok(correction)
            }
            Err(err) => {
                session.submission_failed(ticket.request())?;
                warn!("failed to submit quiz {quiz_id}: {err}");
                self.notifier.error(MSG_SUBMIT_FAILED);
                Err(SessionError::SubmissionFailed(err))
            }
        }
    }

    /// Remove the persisted draft after a correction, retrying once.
    fn discard_draft(&self, session: &QuizSession) {
        let key = session.draft_key();
        let Err(first) = self.drafts.clear(key) else {
            return;
        };
        debug!("retrying draft removal for {key} after: {first}");
        if let Err(err) = self.drafts.clear(key) {
            warn!("failed to clear draft {key}: {err}");
            self.notifier.error(MSG_CLEAR_FAILED);
        }
    }

    fn persist(&self, session: &QuizSession) -> Result<(), SessionError> {
        if let Err(err) = self.drafts.save(session.draft_key(), session.answers()) {
            warn!("failed to persist draft {}: {err}", session.draft_key());
            self.notifier.error(MSG_SAVE_FAILED);
            return Err(err.into());
        }
        Ok(())
    }
}
