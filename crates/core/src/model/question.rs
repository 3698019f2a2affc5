use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

const TRUE_FALSE_CHOICES: [&str; 2] = ["true", "false"];

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    FreeText,
    TrueFalse,
}

impl QuestionKind {
    /// Whether answers are restricted to the listed choices.
    #[must_use]
    pub fn is_closed(self) -> bool {
        !matches!(self, QuestionKind::FreeText)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {0} has no text")]
    EmptyText(QuestionId),

    #[error("multiple choice question {0} has no choices")]
    MissingChoices(QuestionId),
}

/// A single question of a quiz, loaded when the quiz is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: QuestionId,
    text: String,
    choices: Vec<String>,
    kind: QuestionKind,
}

impl QuizQuestion {
    /// Build a question, normalising choices for true/false questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` for blank question text and
    /// `QuestionError::MissingChoices` for a multiple choice question without choices.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        kind: QuestionKind,
        choices: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText(id));
        }

        let choices = match kind {
            QuestionKind::MultipleChoice if choices.is_empty() => {
                return Err(QuestionError::MissingChoices(id));
            }
            QuestionKind::TrueFalse if choices.is_empty() => TRUE_FALSE_CHOICES
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            _ => choices,
        };

        Ok(Self {
            id,
            text,
            choices,
            kind,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Free text accepts anything; closed questions only their listed choices.
    #[must_use]
    pub fn accepts(&self, answer: &str) -> bool {
        if !self.kind.is_closed() {
            return true;
        }
        self.choices.iter().any(|choice| choice == answer)
    }
}
