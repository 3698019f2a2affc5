#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod board;
pub mod config;
pub mod error;
pub mod notifications;
pub mod sessions;

pub use najah_core::Clock;

pub use api::{HttpQuizApi, QuizApi, SubmittedAnswer};
pub use auth::AuthContext;
pub use board::{AssignmentBoard, AssignmentRow, BoardFilter, BoardService};
pub use config::{ApiConfig, ApiConfigDraft};
pub use error::{ApiConfigError, ApiError, SessionError};
pub use notifications::{
    Notice, NoticeLevel, NoticeReceiver, Notifier, Toast, ToastTray, forward_push_messages,
    notice_channel,
};
pub use sessions::{
    QuizSession, SessionController, SessionFailure, SessionPhase, SessionProgress,
};
