//! Persistence of in-progress answers under their `(quiz_id, user_id)` key.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use najah_core::model::{AnswerSet, DraftKey, QuestionId};
use thiserror::Error;

use crate::repository::{KeyValueStore, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DraftError {
    /// The stored draft could not be decoded.
    #[error("persisted answers for {key} are malformed: {reason}")]
    RestoreFailed { key: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Reads and writes answer drafts through a [`KeyValueStore`].
///
/// Drafts are stored as a JSON object mapping decimal question ids to answers.
#[derive(Clone)]
pub struct DraftRepository {
    store: Arc<dyn KeyValueStore>,
}

impl DraftRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the draft for `key` with the full answer set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the backend write fails.
    pub fn save(&self, key: &DraftKey, answers: &AnswerSet) -> Result<(), StorageError> {
        let encoded: BTreeMap<String, &str> = answers
            .iter()
            .map(|(id, value)| (id.to_string(), value))
            .collect();
        let json = serde_json::to_string(&encoded)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(key.as_str(), &json)?;
        debug!("saved {} answers under {key}", answers.len());
        Ok(())
    }

    /// Load the draft for `key`, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::RestoreFailed` if the stored value cannot be decoded
    /// and `DraftError::Storage` if the backend read fails.
    pub fn load(&self, key: &DraftKey) -> Result<Option<AnswerSet>, DraftError> {
        let Some(raw) = self.store.get(key.as_str())? else {
            return Ok(None);
        };

        let restore_failed = |reason: String| DraftError::RestoreFailed {
            key: key.to_string(),
            reason,
        };

        let decoded: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|e| restore_failed(e.to_string()))?;

        let mut answers = AnswerSet::new();
        for (id, value) in decoded {
            let id: QuestionId = id.parse().map_err(|e| restore_failed(format!("{e}")))?;
            answers.set(id, value);
        }
        Ok(Some(answers))
    }

    /// Load the draft, treating any failure as "no draft".
    ///
    /// Losing an unreadable draft is preferable to blocking the session.
    #[must_use]
    pub fn restore(&self, key: &DraftKey) -> AnswerSet {
        match self.load(key) {
            Ok(Some(answers)) => answers,
            Ok(None) => AnswerSet::new(),
            Err(err) => {
                warn!("ignoring persisted answers: {err}");
                AnswerSet::new()
            }
        }
    }

    /// Whether a readable draft exists for `key`.
    #[must_use]
    pub fn exists(&self, key: &DraftKey) -> bool {
        matches!(self.load(key), Ok(Some(_)))
    }

    /// Delete the draft for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub fn clear(&self, key: &DraftKey) -> Result<(), StorageError> {
        self.store.remove(key.as_str())?;
        debug!("cleared draft {key}");
        Ok(())
    }
}
