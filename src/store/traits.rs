//! Key-scoped string storage living for one browsing session.

use async_trait::async_trait;

use crate::error::StorageError;

/// Backend-agnostic session storage.
///
/// Every key lives inside a session scope. Values are opaque strings; typed
/// access goes through [`crate::store::DraftState`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value. `Ok(None)` if the session or key does not exist.
    async fn get(&self, session: &str, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, creating the session if needed.
    async fn set(&self, session: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn delete(&self, session: &str, key: &str) -> Result<(), StorageError>;

    /// Drop the whole session.
    async fn end_session(&self, session: &str) -> Result<(), StorageError>;
}
