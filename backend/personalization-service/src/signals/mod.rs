// ============================================
// Signal Collection
// ============================================
//
// Turns raw per-actor history into the `UserSignals` snapshot the composer
// consumes. The store generation is read before the history, so a cached
// entry is only ever paired with a generation no newer than its data. Any
// write, from this instance or another, makes the next read hit the store.

pub mod cache;

pub use cache::SignalCache;

use crate::models::{ActorContext, BehaviorSignals, DeviceSignals, StateSignals, UserSignals};
use crate::store::{PreferenceStore, SignalHistory, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// Default session window for first-visit detection
pub const DEFAULT_FIRST_VISIT_WINDOW_MINUTES: i64 = 30;

#[async_trait]
pub trait SignalCollector: Send + Sync {
    async fn collect(
        &self,
        actor: &ActorContext,
        device: DeviceSignals,
        now: DateTime<Utc>,
    ) -> StoreResult<UserSignals>;
}

pub struct StoreSignalCollector {
    store: Arc<dyn PreferenceStore>,
    cache: Arc<SignalCache>,
    first_visit_window: Duration,
}

impl StoreSignalCollector {
    pub fn new(store: Arc<dyn PreferenceStore>, cache: Arc<SignalCache>) -> Self {
        Self {
            store,
            cache,
            first_visit_window: Duration::minutes(DEFAULT_FIRST_VISIT_WINDOW_MINUTES),
        }
    }

    pub fn with_first_visit_window(mut self, window: Duration) -> Self {
        self.first_visit_window = window;
        self
    }

    pub fn cache(&self) -> &Arc<SignalCache> {
        &self.cache
    }

    async fn history(&self, actor_id: &str) -> StoreResult<SignalHistory> {
        let generation = self.store.signal_generation(actor_id).await?;
        if let Some(history) = self.cache.get(actor_id, generation) {
            return Ok(history);
        }

        let history = self.store.load_signal_history(actor_id).await?;
        self.cache.insert(actor_id, generation, history.clone());
        Ok(history)
    }
}

#[async_trait]
impl SignalCollector for StoreSignalCollector {
    async fn collect(
        &self,
        actor: &ActorContext,
        device: DeviceSignals,
        now: DateTime<Utc>,
    ) -> StoreResult<UserSignals> {
        let history = self.history(&actor.actor_id).await?;

        let signals = build_signals(&history, actor, device, now, self.first_visit_window);

        debug!(
            actor_id = %actor.actor_id,
            pending = signals.behavior.has_pending_tasks(),
            first_visit = signals.state.is_first_visit,
            days_since_signup = ?signals.state.days_since_signup,
            "Collected signals"
        );

        Ok(signals)
    }
}

/// Pure projection of stored history onto a signal snapshot
pub fn build_signals(
    history: &SignalHistory,
    actor: &ActorContext,
    device: DeviceSignals,
    now: DateTime<Utc>,
    first_visit_window: Duration,
) -> UserSignals {
    let is_first_visit = match history.last_visit_at {
        Some(last) => now.signed_duration_since(last) > first_visit_window,
        None => true,
    };

    let days_since_signup = actor
        .account_created_at
        .as_ref()
        .and_then(|created| created.days_since(now));

    UserSignals {
        behavior: BehaviorSignals {
            pending_tasks: history.pending_tasks.clone(),
        },
        state: StateSignals {
            is_first_visit,
            days_since_signup,
        },
        device,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountCreatedAt, InteractionEvent, PersonalizationSettings};
    use crate::store::InMemoryPreferenceStore;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 30, 12, 0, 0).unwrap()
    }

    fn window() -> Duration {
        Duration::minutes(DEFAULT_FIRST_VISIT_WINDOW_MINUTES)
    }

    #[test]
    fn test_no_visit_is_first_visit() {
        let actor = ActorContext::new("u1", "customer");
        let signals = build_signals(
            &SignalHistory::default(),
            &actor,
            DeviceSignals::default(),
            now(),
            window(),
        );

        assert!(signals.state.is_first_visit);
        assert_eq!(signals.state.days_since_signup, None);
        assert!(!signals.behavior.has_pending_tasks());
    }

    #[test]
    fn test_recent_visit_is_not_first_visit() {
        let actor = ActorContext::new("u1", "customer");
        let history = SignalHistory {
            last_visit_at: Some(now() - Duration::minutes(10)),
            ..Default::default()
        };

        let signals = build_signals(&history, &actor, DeviceSignals::default(), now(), window());
        assert!(!signals.state.is_first_visit);

        let stale = SignalHistory {
            last_visit_at: Some(now() - Duration::hours(3)),
            ..Default::default()
        };
        let signals = build_signals(&stale, &actor, DeviceSignals::default(), now(), window());
        assert!(signals.state.is_first_visit);
    }

    #[test]
    fn test_signup_age_and_device_pass_through() {
        let actor = ActorContext::new("u1", "seller")
            .with_account_created_at(AccountCreatedAt::Raw("2025-10-25".to_string()));
        let signals = build_signals(
            &SignalHistory::default(),
            &actor,
            DeviceSignals { is_mobile: true },
            now(),
            window(),
        );

        assert_eq!(signals.state.days_since_signup, Some(5));
        assert!(signals.device.is_mobile);
    }

    #[test]
    fn test_signup_a_few_hours_ahead_is_not_recent() {
        let actor = ActorContext::new("u1", "seller")
            .with_account_created_at(AccountCreatedAt::Timestamp(now() + Duration::hours(20)));
        let signals = build_signals(
            &SignalHistory::default(),
            &actor,
            DeviceSignals::default(),
            now(),
            window(),
        );

        assert_eq!(signals.state.days_since_signup, Some(-1));
    }

    /// Counts history loads so tests can tell cache hits from store reads
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryPreferenceStore,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl PreferenceStore for CountingStore {
        async fn get_settings(&self, actor_id: &str) -> StoreResult<PersonalizationSettings> {
            self.inner.get_settings(actor_id).await
        }

        async fn save_settings(
            &self,
            actor_id: &str,
            settings: &PersonalizationSettings,
        ) -> StoreResult<()> {
            self.inner.save_settings(actor_id, settings).await
        }

        async fn clear_all_signals(&self, actor_id: &str) -> StoreResult<()> {
            self.inner.clear_all_signals(actor_id).await
        }

        async fn load_signal_history(&self, actor_id: &str) -> StoreResult<SignalHistory> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_signal_history(actor_id).await
        }

        async fn signal_generation(&self, actor_id: &str) -> StoreResult<u64> {
            self.inner.signal_generation(actor_id).await
        }

        async fn set_pending_task(
            &self,
            actor_id: &str,
            task: &str,
            pending: bool,
        ) -> StoreResult<()> {
            self.inner.set_pending_task(actor_id, task, pending).await
        }

        async fn record_visit(
            &self,
            actor_id: &str,
            at: DateTime<Utc>,
        ) -> StoreResult<Option<DateTime<Utc>>> {
            self.inner.record_visit(actor_id, at).await
        }

        async fn append_interaction(
            &self,
            actor_id: &str,
            event: &InteractionEvent,
        ) -> StoreResult<()> {
            self.inner.append_interaction(actor_id, event).await
        }
    }

    #[tokio::test]
    async fn test_collector_reuses_cache_while_store_is_unchanged() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(SignalCache::new(std::time::Duration::from_secs(60)));
        let collector = StoreSignalCollector::new(store.clone(), cache.clone());
        let actor = ActorContext::new("u1", "seller");

        for _ in 0..3 {
            collector
                .collect(&actor, DeviceSignals::default(), now())
                .await
                .unwrap();
        }

        assert_eq!(store.loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_write_behind_the_cache_is_seen_on_next_collect() {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(SignalCache::new(std::time::Duration::from_secs(60)));
        let collector = StoreSignalCollector::new(store.clone(), cache.clone());
        let actor = ActorContext::new("u1", "seller");

        let before = collector
            .collect(&actor, DeviceSignals::default(), now())
            .await
            .unwrap();
        assert!(!before.behavior.has_pending_tasks());

        // Written straight to the store, as another instance would; nothing
        // invalidates this process's cache
        store.set_pending_task("u1", "ordersPending", true).await.unwrap();
        let after = collector
            .collect(&actor, DeviceSignals::default(), now())
            .await
            .unwrap();
        assert!(after.behavior.has_pending_tasks());

        store.clear_all_signals("u1").await.unwrap();
        let purged = collector
            .collect(&actor, DeviceSignals::default(), now())
            .await
            .unwrap();
        assert!(!purged.behavior.has_pending_tasks());
        assert_eq!(store.loads.load(Ordering::SeqCst), 3);
    }
}
