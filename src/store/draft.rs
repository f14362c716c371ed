//! Typed access to the four signup slots of one session.
//!
//! Storage is best-effort: read failures and corrupted values read as
//! absent, write failures are logged and dropped. Nothing here returns an
//! error, so a broken store can never block navigation.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::traits::SessionStore;
use crate::error::StorageError;
use crate::signup::model::{StateCode, Step1Answers, Step2Draft, UserId, session_keys};
use crate::signup::state::Effect;

/// The signup slots of a single session.
pub struct DraftState<'a> {
    store: &'a dyn SessionStore,
    session: &'a str,
}

impl<'a> DraftState<'a> {
    pub fn new(store: &'a dyn SessionStore, session: &'a str) -> Self {
        Self { store, session }
    }

    /// Validated background answers, if the step was completed.
    pub async fn step1(&self) -> Option<Step1Answers> {
        self.read_json(session_keys::STEP1).await
    }

    /// Details draft saved on back navigation.
    pub async fn draft(&self) -> Option<Step2Draft> {
        self.read_json(session_keys::STEP2_DRAFT).await
    }

    /// Identifier assigned at registration.
    pub async fn user_id(&self) -> Option<UserId> {
        self.read(session_keys::USER_ID)
            .await
            .filter(|id| !id.is_empty())
            .map(UserId::new)
    }

    /// State code submitted with the registration.
    pub async fn chosen_state(&self) -> Option<StateCode> {
        self.read(session_keys::STATE)
            .await
            .and_then(|code| StateCode::parse(&code))
    }

    /// Apply the session effects of a transition, in order.
    pub async fn apply(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::SaveStep1(answers) => self.write_json(session_keys::STEP1, answers).await,
                Effect::SaveDraft(draft) => self.write_json(session_keys::STEP2_DRAFT, draft).await,
                Effect::SaveRegistration { user_id, state } => {
                    self.write(session_keys::USER_ID, user_id.as_str()).await;
                    self.write(session_keys::STATE, state.as_str()).await;
                }
                Effect::ClearDraft => self.remove(session_keys::STEP2_DRAFT).await,
                Effect::ClearAll => {
                    if let Err(e) = self.store.end_session(self.session).await {
                        warn!(session = self.session, "Failed to end session: {}", e);
                        // Fall back to clearing the slots one by one
                        for key in session_keys::ALL {
                            self.remove(key).await;
                        }
                    }
                }
            }
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(self.session, key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(session = self.session, key, "Failed to read session slot: {}", e);
                None
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read(key).await?;
        match serde_json::from_str(&raw).map_err(StorageError::from) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(session = self.session, key, "Ignoring corrupted session slot: {}", e);
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(self.session, key, value).await {
            warn!(session = self.session, key, "Failed to persist session slot: {}", e);
        }
    }

    async fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value).map_err(StorageError::from) {
            Ok(json) => self.write(key, &json).await,
            Err(e) => warn!(key, "Failed to serialize session slot: {}", e),
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.store.delete(self.session, key).await {
            warn!(session = self.session, key, "Failed to clear session slot: {}", e);
        }
    }
}
