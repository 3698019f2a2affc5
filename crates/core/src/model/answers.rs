use std::collections::BTreeMap;
use std::fmt;

use crate::model::ids::{QuestionId, QuizId, UserId};
use crate::model::question::QuizQuestion;

//
// ─── DRAFT KEY ─────────────────────────────────────────────────────────────────
//

/// Local persistence key for in-progress answers.
///
/// Derived only from `(quiz_id, user_id)` so a reload or a later visit finds the
/// same draft, and a different user on the same device never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey {
    raw: String,
}

impl DraftKey {
    #[must_use]
    pub fn new(quiz_id: QuizId, user_id: UserId) -> Self {
        Self {
            raw: format!("quiz_answers_{quiz_id}_{user_id}"),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

//
// ─── ANSWER SET ────────────────────────────────────────────────────────────────
//

/// Answers given so far in a session, keyed by question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, String>,
}

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the answer for a question.
    pub fn set(&mut self, question: QuestionId, value: impl Into<String>) {
        self.answers.insert(question, value.into());
    }

    pub fn remove(&mut self, question: QuestionId) -> Option<String> {
        self.answers.remove(&question)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<&str> {
        self.answers.get(&question).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, question: QuestionId) -> bool {
        self.answers.contains_key(&question)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &str)> {
        self.answers.iter().map(|(id, value)| (*id, value.as_str()))
    }

    /// Answers in the order the questions are asked; unanswered ones are skipped.
    #[must_use]
    pub fn in_question_order(&self, questions: &[QuizQuestion]) -> Vec<(QuestionId, String)> {
        questions
            .iter()
            .filter_map(|q| self.get(q.id()).map(|value| (q.id(), value.to_string())))
            .collect()
    }

    /// Drop answers for questions outside `questions` or with a value the
    /// question does not accept. Returns the dropped ids.
    pub fn retain_answerable(&mut self, questions: &[QuizQuestion]) -> Vec<QuestionId> {
        let dropped: Vec<QuestionId> = self
            .iter()
            .filter(|(id, value)| {
                !questions
                    .iter()
                    .any(|q| q.id() == *id && q.accepts(value))
            })
            .map(|(id, _)| id)
            .collect();
        for id in &dropped {
            self.remove(*id);
        }
        dropped
    }

    /// Number of the given questions that have an answer.
    #[must_use]
    pub fn answered_among(&self, questions: &[QuizQuestion]) -> usize {
        questions.iter().filter(|q| self.contains(q.id())).count()
    }
}

impl FromIterator<(QuestionId, String)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (QuestionId, String)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionKind;

    fn question(id: u64) -> QuizQuestion {
        QuizQuestion::new(QuestionId::new(id), format!("Q{id}"), QuestionKind::FreeText, vec![])
            .unwrap()
    }

    #[test]
    fn draft_key_is_deterministic() {
        let a = DraftKey::new(QuizId::new(12), UserId::new(7));
        let b = DraftKey::new(QuizId::new(12), UserId::new(7));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "quiz_answers_12_7");
    }

    #[test]
    fn draft_key_differs_per_user() {
        let a = DraftKey::new(QuizId::new(12), UserId::new(7));
        let b = DraftKey::new(QuizId::new(12), UserId::new(8));
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn set_overwrites_previous_answer() {
        let mut answers = AnswerSet::new();
        answers.set(QuestionId::new(1), "a");
        answers.set(QuestionId::new(1), "b");
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(QuestionId::new(1)), Some("b"));
    }

    #[test]
    fn question_order_follows_the_quiz_not_the_map() {
        let questions = vec![question(30), question(10), question(20)];
        let mut answers = AnswerSet::new();
        answers.set(QuestionId::new(10), "ten");
        answers.set(QuestionId::new(30), "thirty");

        let ordered = answers.in_question_order(&questions);
        assert_eq!(
            ordered,
            vec![
                (QuestionId::new(30), "thirty".to_string()),
                (QuestionId::new(10), "ten".to_string()),
            ]
        );
        assert_eq!(answers.answered_among(&questions), 2);
    }

    #[test]
    fn unanswerable_entries_are_dropped() {
        let choice = QuizQuestion::new(
            QuestionId::new(2),
            "Q2",
            QuestionKind::MultipleChoice,
            vec!["a".into(), "b".into()],
        )
        .unwrap();
        let questions = vec![question(1), choice];
        let mut answers = AnswerSet::new();
        answers.set(QuestionId::new(1), "anything goes");
        answers.set(QuestionId::new(2), "c");
        answers.set(QuestionId::new(9), "orphan");

        let dropped = answers.retain_answerable(&questions);
        assert_eq!(dropped, vec![QuestionId::new(2), QuestionId::new(9)]);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(QuestionId::new(1)), Some("anything goes"));
    }
}
