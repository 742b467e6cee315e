//! Settings and signal persistence
//!
//! Everything is namespaced by actor id; no operation touches more than one
//! actor. Implementations must give read-your-writes for a single actor so a
//! settings flip is visible to the very next feed computation.
//!
//! Every signal write, purge included, bumps a per-actor generation after
//! (or atomically with) the change. Process-local caches key their entries
//! on it, so a write made by any instance retires every cached copy.

pub mod keys;
pub mod memory;
pub mod redis_store;

pub use keys::StoreKey;
pub use memory::InMemoryPreferenceStore;
pub use redis_store::RedisPreferenceStore;

use crate::models::{InteractionEvent, PersonalizationSettings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Interactions retained per actor
pub const MAX_INTERACTIONS: usize = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw behavioral history for one actor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalHistory {
    pub pending_tasks: BTreeMap<String, bool>,
    pub last_visit_at: Option<DateTime<Utc>>,
    /// Newest first
    pub interactions: Vec<InteractionEvent>,
}

impl SignalHistory {
    pub fn is_empty(&self) -> bool {
        self.pending_tasks.is_empty() && self.last_visit_at.is_none() && self.interactions.is_empty()
    }
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Stored settings, or defaults when the actor has none yet
    async fn get_settings(&self, actor_id: &str) -> StoreResult<PersonalizationSettings>;

    async fn save_settings(
        &self,
        actor_id: &str,
        settings: &PersonalizationSettings,
    ) -> StoreResult<()>;

    /// Remove every behavioral signal of the actor. Settings are kept.
    async fn clear_all_signals(&self, actor_id: &str) -> StoreResult<()>;

    async fn load_signal_history(&self, actor_id: &str) -> StoreResult<SignalHistory>;

    /// Monotonic counter of signal writes; 0 for an actor never written
    async fn signal_generation(&self, actor_id: &str) -> StoreResult<u64>;

    async fn set_pending_task(&self, actor_id: &str, task: &str, pending: bool)
        -> StoreResult<()>;

    /// Store `at` as the latest visit and return the one it replaced
    async fn record_visit(
        &self,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<DateTime<Utc>>>;

    async fn append_interaction(&self, actor_id: &str, event: &InteractionEvent)
        -> StoreResult<()>;
}
