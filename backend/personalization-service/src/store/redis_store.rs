// ============================================
// Redis Preference Store
// ============================================
//
// settings      STRING  JSON PersonalizationSettings (no TTL)
// pending       HASH    task → 0/1
// visit         STRING  RFC 3339 timestamp of the latest visit
// interactions  LIST    JSON InteractionEvent, newest first, capped
// epoch         STRING  INCR counter of signal writes, never deleted
//
// Every signal write runs in one MULTI/EXEC together with the epoch INCR.
// The purge deletes every signal key in the same way so a reader never
// observes a half-cleared history.

use super::{PreferenceStore, SignalHistory, StoreKey, StoreResult, MAX_INTERACTIONS};
use crate::models::{InteractionEvent, PersonalizationSettings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct RedisPreferenceStore {
    redis: redis::Client,
    max_interactions: usize,
}

impl RedisPreferenceStore {
    pub fn new(redis: redis::Client) -> Self {
        Self {
            redis,
            max_interactions: MAX_INTERACTIONS,
        }
    }

    pub fn with_max_interactions(mut self, max_interactions: usize) -> Self {
        self.max_interactions = max_interactions.max(1);
        self
    }

    async fn connection(&self) -> StoreResult<redis::aio::MultiplexedConnection> {
        Ok(self.redis.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl PreferenceStore for RedisPreferenceStore {
    async fn get_settings(&self, actor_id: &str) -> StoreResult<PersonalizationSettings> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(StoreKey::settings(actor_id)).await?;

        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(PersonalizationSettings::default()),
        }
    }

    async fn save_settings(
        &self,
        actor_id: &str,
        settings: &PersonalizationSettings,
    ) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let json = serde_json::to_string(settings)?;

        let _: () = conn.set(StoreKey::settings(actor_id), json).await?;

        debug!(actor_id = actor_id, enabled = settings.enabled, "Saved settings");
        Ok(())
    }

    async fn clear_all_signals(&self, actor_id: &str) -> StoreResult<()> {
        let mut conn = self.connection().await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in StoreKey::signal_keys(actor_id) {
            pipe.del(key).ignore();
        }
        pipe.incr(StoreKey::signal_epoch(actor_id), 1).ignore();
        let _: () = pipe.query_async(&mut conn).await?;

        info!(actor_id = actor_id, "Purged behavioral signals");
        Ok(())
    }

    async fn load_signal_history(&self, actor_id: &str) -> StoreResult<SignalHistory> {
        let mut conn = self.connection().await?;

        let pending: HashMap<String, bool> =
            conn.hgetall(StoreKey::pending_tasks(actor_id)).await?;
        let last_visit: Option<String> = conn.get(StoreKey::last_visit(actor_id)).await?;
        let raw_events: Vec<String> = conn
            .lrange(StoreKey::interactions(actor_id), 0, -1)
            .await?;

        let last_visit_at = last_visit.and_then(|raw| parse_timestamp(actor_id, &raw));

        // Undecodable entries are skipped rather than failing the whole read
        let interactions = raw_events
            .iter()
            .filter_map(|json| serde_json::from_str::<InteractionEvent>(json).ok())
            .collect();

        Ok(SignalHistory {
            pending_tasks: pending.into_iter().collect(),
            last_visit_at,
            interactions,
        })
    }

    async fn signal_generation(&self, actor_id: &str) -> StoreResult<u64> {
        let mut conn = self.connection().await?;
        let epoch: Option<u64> = conn.get(StoreKey::signal_epoch(actor_id)).await?;
        Ok(epoch.unwrap_or(0))
    }

    async fn set_pending_task(
        &self,
        actor_id: &str,
        task: &str,
        pending: bool,
    ) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .hset(StoreKey::pending_tasks(actor_id), task, pending)
            .ignore()
            .incr(StoreKey::signal_epoch(actor_id), 1)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn record_visit(
        &self,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let mut conn = self.connection().await?;
        let (previous,): (Option<String>,) = redis::pipe()
            .atomic()
            .getset(StoreKey::last_visit(actor_id), at.to_rfc3339())
            .incr(StoreKey::signal_epoch(actor_id), 1)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(previous.and_then(|raw| parse_timestamp(actor_id, &raw)))
    }

    async fn append_interaction(
        &self,
        actor_id: &str,
        event: &InteractionEvent,
    ) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let key = StoreKey::interactions(actor_id);
        let json = serde_json::to_string(event)?;

        let _: () = redis::pipe()
            .atomic()
            .lpush(&key, json)
            .ignore()
            .ltrim(&key, 0, self.max_interactions as isize - 1)
            .ignore()
            .incr(StoreKey::signal_epoch(actor_id), 1)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}

fn parse_timestamp(actor_id: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            warn!(actor_id = actor_id, value = raw, error = %e, "Ignoring malformed visit timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp("u1", "2025-10-30T09:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-10-30T09:00:00+00:00");
        assert!(parse_timestamp("u1", "yesterday").is_none());
    }

    #[test]
    fn test_interaction_cap_never_zero() {
        let client = redis::Client::open("redis://127.0.0.1:6379").unwrap();
        let store = RedisPreferenceStore::new(client).with_max_interactions(0);
        assert_eq!(store.max_interactions, 1);
    }
}
