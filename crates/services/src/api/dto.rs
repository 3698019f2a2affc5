//! Wire shapes of the quiz endpoints and their conversion into domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use najah_core::model::{
    AssignmentId, CompletedQuizRecord, CorrectionResult, QuestionCorrection, QuestionId,
    QuestionKind, QuizAssignment, QuizId, QuizQuestion, RecordId, parse_due_date,
    percentage_of,
};

use super::SubmittedAnswer;
use crate::error::ApiError;

//
// ─── ASSIGNMENTS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(super) struct AssignmentDto {
    id: u64,
    quiz_id: u64,
    title: String,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl AssignmentDto {
    pub(super) fn into_domain(self) -> Result<QuizAssignment, ApiError> {
        let due_date = match self.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_due_date(raw)
                    .ok_or_else(|| ApiError::Decode(format!("invalid due_date {raw:?}")))?,
            ),
        };
        Ok(QuizAssignment {
            id: AssignmentId::new(self.id),
            quiz_id: QuizId::new(self.quiz_id),
            title: self.title,
            due_date,
            server_status: self.status,
        })
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(super) struct ResultDto {
    id: u64,
    quiz_id: u64,
    score: f64,
    max_score: f64,
    #[serde(default)]
    percentage: Option<f64>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    is_completed: Option<bool>,
}

impl ResultDto {
    pub(super) fn into_domain(self) -> CompletedQuizRecord {
        // Backends populate one flag or the other; either one marks completion.
        let completed = self.completed.unwrap_or(false) || self.is_completed.unwrap_or(false);
        CompletedQuizRecord {
            id: RecordId::new(self.id),
            quiz_id: QuizId::new(self.quiz_id),
            score: self.score,
            max_score: self.max_score,
            percentage: self
                .percentage
                .unwrap_or_else(|| percentage_of(self.score, self.max_score)),
            created_at: self.created_at,
            completed,
        }
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(super) struct StartQuizResponse {
    pub(super) questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuestionDto {
    id: u64,
    question_text: String,
    #[serde(default)]
    choices: Vec<String>,
    #[serde(alias = "question_type")]
    kind: QuestionKind,
}

impl QuestionDto {
    pub(super) fn into_domain(self) -> Result<QuizQuestion, ApiError> {
        Ok(QuizQuestion::new(
            QuestionId::new(self.id),
            self.question_text,
            self.kind,
            self.choices,
        )?)
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(super) struct SubmitRequest<'a> {
    pub(super) answers: &'a [SubmittedAnswer],
}

#[derive(Debug, Deserialize)]
pub(super) struct CorrectionDto {
    score: f64,
    max_score: f64,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default)]
    corrections: Vec<CorrectionItemDto>,
}

#[derive(Debug, Deserialize)]
struct CorrectionItemDto {
    question: String,
    #[serde(default)]
    student_answer: Option<String>,
    correct_answer: String,
    is_correct: bool,
    #[serde(default)]
    points: f64,
}

impl CorrectionDto {
    pub(super) fn into_domain(self) -> CorrectionResult {
        CorrectionResult {
            score: self.score,
            max_score: self.max_score,
            percentage: self
                .percentage
                .unwrap_or_else(|| percentage_of(self.score, self.max_score)),
            corrections: self
                .corrections
                .into_iter()
                .map(|item| QuestionCorrection {
                    question: item.question,
                    student_answer: item.student_answer.unwrap_or_default(),
                    correct_answer: item.correct_answer,
                    is_correct: item.is_correct,
                    points: item.points,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_completion_accepts_either_flag() {
        let a: ResultDto = serde_json::from_str(
            r#"{"id":1,"quiz_id":2,"score":17,"max_score":20,"percentage":85,
                "created_at":"2024-03-01T10:00:00Z","is_completed":true}"#,
        )
        .unwrap();
        assert!(a.into_domain().completed);

        let b: ResultDto = serde_json::from_str(
            r#"{"id":1,"quiz_id":2,"score":17,"max_score":20,
                "created_at":"2024-03-01T10:00:00Z","completed":false}"#,
        )
        .unwrap();
        let record = b.into_domain();
        assert!(!record.completed);
        assert!((record.percentage - 85.0).abs() < 1e-9);
    }

    #[test]
    fn assignment_due_date_formats() {
        let dto: AssignmentDto = serde_json::from_str(
            r#"{"id":1,"quiz_id":2,"title":"Algèbre","due_date":"2024-06-01","status":"assigné"}"#,
        )
        .unwrap();
        let assignment = dto.into_domain().unwrap();
        assert!(assignment.due_date.is_some());
        assert_eq!(assignment.server_status(), Some("assigné"));

        let dto: AssignmentDto =
            serde_json::from_str(r#"{"id":1,"quiz_id":2,"title":"x","due_date":"demain"}"#)
                .unwrap();
        assert!(matches!(dto.into_domain(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn question_kind_alias_and_validation() {
        let response: StartQuizResponse = serde_json::from_str(
            r#"{"questions":[
                {"id":1,"question_text":"2+2 ?","choices":["3","4"],"kind":"multiple_choice"},
                {"id":2,"question_text":"Vrai ?","question_type":"true_false"}
            ]}"#,
        )
        .unwrap();
        let questions: Vec<QuizQuestion> = response
            .questions
            .into_iter()
            .map(QuestionDto::into_domain)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(questions[1].choices().len(), 2);

        let bad: StartQuizResponse = serde_json::from_str(
            r#"{"questions":[{"id":3,"question_text":"?","kind":"multiple_choice"}]}"#,
        )
        .unwrap();
        let err = bad
            .questions
            .into_iter()
            .next()
            .unwrap()
            .into_domain()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidQuestion(_)));
    }

    #[test]
    fn submit_request_shape() {
        let answers = vec![SubmittedAnswer {
            question_id: QuestionId::new(7),
            answer: "4".into(),
        }];
        let json = serde_json::to_string(&SubmitRequest { answers: &answers }).unwrap();
        assert_eq!(json, r#"{"answers":[{"question_id":7,"answer":"4"}]}"#);
    }

    #[test]
    fn correction_defaults_missing_fields() {
        let dto: CorrectionDto = serde_json::from_str(
            r#"{"score":1,"max_score":4,"corrections":[
                {"question":"Q1","correct_answer":"a","is_correct":false}
            ]}"#,
        )
        .unwrap();
        let result = dto.into_domain();
        assert!((result.percentage - 25.0).abs() < 1e-9);
        assert_eq!(result.corrections[0].student_answer, "");
        assert_eq!(result.corrections[0].points, 0.0);
    }
}
