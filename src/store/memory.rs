//! In-memory session store with idle expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::traits::SessionStore;
use crate::error::StorageError;

struct SessionEntry {
    values: HashMap<String, String>,
    last_seen: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            last_seen: Utc::now(),
        }
    }
}

/// Process-local session storage. A session ends when it is explicitly
/// ended or stays idle longer than `idle_timeout`.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl MemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle longer than the timeout. Returns how many were dropped.
    pub async fn prune_idle(&self) -> usize {
        let Ok(timeout) = chrono::Duration::from_std(self.idle_timeout) else {
            return 0;
        };
        let cutoff = Utc::now() - timeout;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen > cutoff);
        let pruned = before - sessions.len();

        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "Pruned idle sessions");
        }
        pruned
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        chrono::Duration::from_std(self.idle_timeout)
            .map(|timeout| entry.last_seen + timeout <= Utc::now())
            .unwrap_or(false)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session: &str, key: &str) -> Result<Option<String>, StorageError> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get(session) {
            Some(entry) => self.is_expired(entry),
            None => return Ok(None),
        };
        if expired {
            debug!(session, "Session expired on access");
            sessions.remove(session);
            return Ok(None);
        }
        Ok(sessions.get_mut(session).and_then(|entry| {
            entry.last_seen = Utc::now();
            entry.values.get(key).cloned()
        }))
    }

    async fn set(&self, session: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(session).is_some_and(|entry| self.is_expired(entry)) {
            sessions.remove(session);
        }
        let entry = sessions
            .entry(session.to_string())
            .or_insert_with(SessionEntry::new);
        entry.last_seen = Utc::now();
        entry.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, session: &str, key: &str) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session) {
            entry.values.remove(key);
            entry.last_seen = Utc::now();
        }
        Ok(())
    }

    async fn end_session(&self, session: &str) -> Result<(), StorageError> {
        self.sessions.write().await.remove(session);
        Ok(())
    }
}

/// Spawn a background task that prunes idle sessions every `interval`.
pub fn spawn_sweeper(
    store: Arc<MemorySessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.prune_idle().await;
        }
    })
}
