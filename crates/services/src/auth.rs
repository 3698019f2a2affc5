use std::fmt;

use najah_core::model::UserId;

/// The authenticated user, passed explicitly to every service that needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    token: Option<String>,
}

impl AuthContext {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            token: None,
        }
    }

    /// Attach a bearer token. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then(|| token.trim().to_string());
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("user_id", &self.user_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
