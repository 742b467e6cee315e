// ============================================
// Settings & Signal Lifecycle
// ============================================
//
// Turning personalization off is destructive and strictly ordered:
//   1. clear every recorded behavioral signal
//   2. persist the new settings
//   3. drop all cached signal reads
// A failed purge aborts before step 2 so the actor stays enabled and can
// retry. Signal writes hold the shared side of `transitions` and re-check
// settings under it, so no write can land between a purge and the save.

use crate::metrics;
use crate::models::{InteractionEvent, PersonalizationSettings};
use crate::signals::SignalCache;
use crate::store::{PreferenceStore, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Outcome of a settings update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsChange {
    /// enabled true → false; signals were erased
    Purged,
    /// Nothing written
    Unchanged,
    Saved,
}

pub struct SettingsLifecycle {
    store: Arc<dyn PreferenceStore>,
    cache: Arc<SignalCache>,
    transitions: RwLock<()>,
}

impl SettingsLifecycle {
    pub fn new(store: Arc<dyn PreferenceStore>, cache: Arc<SignalCache>) -> Self {
        Self {
            store,
            cache,
            transitions: RwLock::new(()),
        }
    }

    pub async fn settings(&self, actor_id: &str) -> StoreResult<PersonalizationSettings> {
        self.store.get_settings(actor_id).await
    }

    pub async fn update_settings(
        &self,
        actor_id: &str,
        next: PersonalizationSettings,
    ) -> StoreResult<SettingsChange> {
        let _guard = self.transitions.write().await;
        let current = self.store.get_settings(actor_id).await?;

        if current.enabled && !next.enabled {
            if let Err(e) = self.store.clear_all_signals(actor_id).await {
                error!(actor_id = actor_id, error = %e, "Signal purge failed, settings left unchanged");
                metrics::record_signal_purge("error");
                return Err(e);
            }
            metrics::record_signal_purge("success");

            self.store.save_settings(actor_id, &next).await?;
            self.cache.invalidate_all();

            info!(actor_id = actor_id, "Personalization disabled, signals purged");
            return Ok(SettingsChange::Purged);
        }

        // Sub-switches are inert while disabled
        if !current.enabled && !next.enabled {
            debug!(actor_id = actor_id, "Ignoring settings change while disabled");
            return Ok(SettingsChange::Unchanged);
        }

        if current == next {
            return Ok(SettingsChange::Unchanged);
        }

        self.store.save_settings(actor_id, &next).await?;
        self.cache.invalidate(actor_id);

        info!(
            actor_id = actor_id,
            enabled = next.enabled,
            collect_behavior = next.collect_behavior,
            show_recommendations = next.show_recommendations,
            "Settings saved"
        );
        Ok(SettingsChange::Saved)
    }

    /// Returns `false` when collection is switched off and nothing was written
    pub async fn record_interaction(
        &self,
        actor_id: &str,
        event: &InteractionEvent,
    ) -> StoreResult<bool> {
        let _guard = self.transitions.read().await;

        if !self.collection_allowed(actor_id).await? {
            metrics::record_interaction(event.kind.as_str(), "ignored");
            return Ok(false);
        }

        self.store.append_interaction(actor_id, event).await?;
        self.cache.invalidate(actor_id);
        metrics::record_interaction(event.kind.as_str(), "recorded");

        debug!(
            actor_id = actor_id,
            family = event.family.as_str(),
            item_id = %event.item_id,
            position = event.position,
            kind = event.kind.as_str(),
            "Interaction recorded"
        );
        Ok(true)
    }

    pub async fn set_pending_task(
        &self,
        actor_id: &str,
        task: &str,
        pending: bool,
    ) -> StoreResult<bool> {
        let _guard = self.transitions.read().await;

        if !self.collection_allowed(actor_id).await? {
            debug!(actor_id = actor_id, task = task, "Pending task update ignored");
            return Ok(false);
        }

        self.store.set_pending_task(actor_id, task, pending).await?;
        self.cache.invalidate(actor_id);
        Ok(true)
    }

    pub async fn record_visit(&self, actor_id: &str, at: DateTime<Utc>) -> StoreResult<bool> {
        let _guard = self.transitions.read().await;

        if !self.collection_allowed(actor_id).await? {
            return Ok(false);
        }

        self.store.record_visit(actor_id, at).await?;
        self.cache.invalidate(actor_id);
        Ok(true)
    }

    async fn collection_allowed(&self, actor_id: &str) -> StoreResult<bool> {
        Ok(self.store.get_settings(actor_id).await?.allows_collection())
    }
}
