/// Per-question outcome returned by the scoring endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCorrection {
    pub question: String,
    pub student_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points: f64,
}

/// Scored result of a submission. Produced once per successful submit.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub corrections: Vec<QuestionCorrection>,
}

impl CorrectionResult {
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.corrections.iter().filter(|c| c.is_correct).count()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.corrections.len()
    }
}

/// `score / max_score` as a percentage; zero when there is nothing to score.
#[must_use]
pub fn percentage_of(score: f64, max_score: f64) -> f64 {
    if max_score > 0.0 {
        score / max_score * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_correct_answers() {
        let result = CorrectionResult {
            score: 1.0,
            max_score: 2.0,
            percentage: 50.0,
            corrections: vec![
                QuestionCorrection {
                    question: "Q1".into(),
                    student_answer: "a".into(),
                    correct_answer: "a".into(),
                    is_correct: true,
                    points: 1.0,
                },
                QuestionCorrection {
                    question: "Q2".into(),
                    student_answer: "b".into(),
                    correct_answer: "c".into(),
                    is_correct: false,
                    points: 0.0,
                },
            ],
        };
        assert_eq!(result.correct_count(), 1);
        assert_eq!(result.total_questions(), 2);
    }

    #[test]
    fn percentage_handles_zero_max() {
        assert!((percentage_of(17.0, 20.0) - 85.0).abs() < f64::EPSILON);
        assert_eq!(percentage_of(3.0, 0.0), 0.0);
    }
}
