use super::{PreferenceStore, SignalHistory, StoreResult, MAX_INTERACTIONS};
use crate::models::{InteractionEvent, PersonalizationSettings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

/// Process-local store for tests and single-node development
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    settings: DashMap<String, PersonalizationSettings>,
    signals: DashMap<String, SignalHistory>,
    generations: DashMap<String, u64>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the write is applied so readers never pair a new
    /// generation with old data
    fn bump_generation(&self, actor_id: &str) {
        *self.generations.entry(actor_id.to_string()).or_default() += 1;
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get_settings(&self, actor_id: &str) -> StoreResult<PersonalizationSettings> {
        Ok(self
            .settings
            .get(actor_id)
            .map(|entry| *entry.value())
            .unwrap_or_default())
    }

    async fn save_settings(
        &self,
        actor_id: &str,
        settings: &PersonalizationSettings,
    ) -> StoreResult<()> {
        self.settings.insert(actor_id.to_string(), *settings);
        Ok(())
    }

    async fn clear_all_signals(&self, actor_id: &str) -> StoreResult<()> {
        let removed = self.signals.remove(actor_id).is_some();
        self.bump_generation(actor_id);
        debug!(actor_id = actor_id, removed = removed, "Cleared in-memory signals");
        Ok(())
    }

    async fn load_signal_history(&self, actor_id: &str) -> StoreResult<SignalHistory> {
        Ok(self
            .signals
            .get(actor_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn signal_generation(&self, actor_id: &str) -> StoreResult<u64> {
        Ok(self
            .generations
            .get(actor_id)
            .map(|entry| *entry.value())
            .unwrap_or(0))
    }

    async fn set_pending_task(
        &self,
        actor_id: &str,
        task: &str,
        pending: bool,
    ) -> StoreResult<()> {
        self.signals
            .entry(actor_id.to_string())
            .or_default()
            .pending_tasks
            .insert(task.to_string(), pending);
        self.bump_generation(actor_id);
        Ok(())
    }

    async fn record_visit(
        &self,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let previous = self
            .signals
            .entry(actor_id.to_string())
            .or_default()
            .last_visit_at
            .replace(at);
        self.bump_generation(actor_id);
        Ok(previous)
    }

    async fn append_interaction(
        &self,
        actor_id: &str,
        event: &InteractionEvent,
    ) -> StoreResult<()> {
        {
            let mut history = self.signals.entry(actor_id.to_string()).or_default();
            history.interactions.insert(0, event.clone());
            history.interactions.truncate(MAX_INTERACTIONS);
        }
        self.bump_generation(actor_id);
        Ok(())
    }
}
