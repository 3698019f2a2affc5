#![forbid(unsafe_code)]

pub mod drafts;
pub mod repository;
pub mod sqlite;

pub use drafts::{DraftError, DraftRepository};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
