mod answers;
mod assignment;
mod correction;
mod cursor;
mod ids;
mod question;
mod record;

pub use answers::{AnswerSet, DraftKey};
pub use assignment::{QuizAssignment, parse_due_date};
pub use correction::{CorrectionResult, QuestionCorrection, percentage_of};
pub use cursor::{CursorAction, QuestionCursor};
pub use ids::{AssignmentId, ParseIdError, QuestionId, QuizId, RecordId, UserId};
pub use question::{QuestionError, QuestionKind, QuizQuestion};
pub use record::{CompletedQuizRecord, latest_completed};
