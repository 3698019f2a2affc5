mod controller;
mod progress;
mod state;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::SessionController;
pub use progress::SessionProgress;
pub use state::{
    QuizSession, RequestTicket, SessionFailure, SessionPhase, SubmitTicket,
};
