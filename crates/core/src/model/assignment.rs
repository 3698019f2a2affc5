use chrono::{DateTime, NaiveDate, Utc};

use crate::model::ids::{AssignmentId, QuizId};

/// A quiz handed to a student by the server.
///
/// Immutable on the client; the only thing derived from it locally is the
/// display status (see [`crate::status::StatusResolver`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAssignment {
    pub id: AssignmentId,
    pub quiz_id: QuizId,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub server_status: Option<String>,
}

impl QuizAssignment {
    #[must_use]
    pub fn new(id: AssignmentId, quiz_id: QuizId, title: impl Into<String>) -> Self {
        Self {
            id,
            quiz_id,
            title: title.into(),
            due_date: None,
            server_status: None,
        }
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn with_server_status(mut self, status: impl Into<String>) -> Self {
        self.server_status = Some(status.into());
        self
    }

    /// Raw server status, with blank values treated as missing.
    #[must_use]
    pub fn server_status(&self) -> Option<&str> {
        self.server_status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// True when a due date exists and lies strictly before `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now)
    }
}

/// Parse a due date as sent by the API: either RFC 3339 or a bare `YYYY-MM-DD`
/// (midnight UTC).
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
