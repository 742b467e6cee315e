//! Settings and signal lifecycle against the in-memory store, plus store
//! failure handling through a mocked `PreferenceStore`.

use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use personalization_service::config::Config;
use personalization_service::lifecycle::{SettingsChange, SettingsLifecycle};
use personalization_service::models::{
    ActorContext, DeviceSignals, FeedSource, InteractionEvent, PersonalizationSettings,
};
use personalization_service::signals::SignalCache;
use personalization_service::store::{
    InMemoryPreferenceStore, PreferenceStore, SignalHistory, StoreError, StoreResult,
};
use personalization_service::{build_service, ContentCatalog, PersonalizationService};
use std::sync::Arc;
use std::time::Duration;

// ============================================
// Mock Preference Store
// ============================================

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl PreferenceStore for Store {
        async fn get_settings(&self, actor_id: &str) -> StoreResult<PersonalizationSettings>;
        async fn save_settings(&self, actor_id: &str, settings: &PersonalizationSettings) -> StoreResult<()>;
        async fn clear_all_signals(&self, actor_id: &str) -> StoreResult<()>;
        async fn load_signal_history(&self, actor_id: &str) -> StoreResult<SignalHistory>;
        async fn signal_generation(&self, actor_id: &str) -> StoreResult<u64>;
        async fn set_pending_task(&self, actor_id: &str, task: &str, pending: bool) -> StoreResult<()>;
        async fn record_visit(&self, actor_id: &str, at: DateTime<Utc>) -> StoreResult<Option<DateTime<Utc>>>;
        async fn append_interaction(&self, actor_id: &str, event: &InteractionEvent) -> StoreResult<()>;
    }
}

// ============================================
// Helpers
// ============================================

fn config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

fn service_over(store: Arc<dyn PreferenceStore>) -> PersonalizationService {
    build_service(&config(), ContentCatalog::builtin().clone(), store)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 30, 9, 0, 0).unwrap()
}

fn seller() -> ActorContext {
    ActorContext::new("seller-1", "seller")
}

// ============================================
// Disable purge
// ============================================

#[tokio::test]
async fn test_disable_purges_signals_before_next_read() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let service = service_over(store.clone());
    let lifecycle = service.lifecycle();

    lifecycle
        .set_pending_task("seller-1", "ordersPending", true)
        .await
        .unwrap();
    let before = service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert_eq!(before.main_cards[0].id, "seller-pending-orders");

    let change = lifecycle
        .update_settings(
            "seller-1",
            PersonalizationSettings {
                enabled: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(change, SettingsChange::Purged);

    let history = store.load_signal_history("seller-1").await.unwrap();
    assert!(history.pending_tasks.is_empty());
    assert!(history.last_visit_at.is_none());

    let disabled = service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert_eq!(disabled.metadata.source, FeedSource::Default);
}

#[tokio::test]
async fn test_reenabled_actor_starts_from_clean_history() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let service = service_over(store.clone());
    let lifecycle = service.lifecycle();

    lifecycle
        .set_pending_task("seller-1", "ordersPending", true)
        .await
        .unwrap();
    // Warm the signal cache with the pending task
    service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();

    lifecycle
        .update_settings("seller-1", PersonalizationSettings::disabled())
        .await
        .unwrap();
    lifecycle
        .update_settings("seller-1", PersonalizationSettings::default())
        .await
        .unwrap();

    let feed = service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert_eq!(feed.metadata.source, FeedSource::Rules);
    assert!(feed.main_cards.iter().all(|c| c.id != "seller-pending-orders"));
}

#[tokio::test]
async fn test_no_writes_while_disabled() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let service = service_over(store.clone());
    let lifecycle = service.lifecycle();

    lifecycle
        .update_settings("seller-1", PersonalizationSettings::disabled())
        .await
        .unwrap();

    assert!(!lifecycle
        .set_pending_task("seller-1", "ordersPending", true)
        .await
        .unwrap());
    service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();

    assert_eq!(
        store.load_signal_history("seller-1").await.unwrap(),
        SignalHistory::default()
    );
}

#[tokio::test]
async fn test_hidden_recommendations_are_honoured() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let service = service_over(store);

    service
        .lifecycle()
        .update_settings(
            "seller-1",
            PersonalizationSettings {
                show_recommendations: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let feed = service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert!(feed.suggestions.is_empty());
    assert_eq!(feed.metadata.source, FeedSource::Rules);
}

// ============================================
// Instances sharing one store
// ============================================

#[tokio::test]
async fn test_purge_on_one_instance_reaches_anothers_cache() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let instance_a = service_over(store.clone());
    let instance_b = service_over(store.clone());

    instance_a
        .lifecycle()
        .set_pending_task("seller-1", "ordersPending", true)
        .await
        .unwrap();
    instance_a
        .lifecycle()
        .update_settings(
            "seller-1",
            PersonalizationSettings {
                collect_behavior: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // B caches the pending task; no visit is written while collection is off
    let warm = instance_b
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert_eq!(warm.main_cards[0].id, "seller-pending-orders");

    instance_a
        .lifecycle()
        .update_settings("seller-1", PersonalizationSettings::disabled())
        .await
        .unwrap();
    instance_a
        .lifecycle()
        .update_settings("seller-1", PersonalizationSettings::default())
        .await
        .unwrap();

    let feed = instance_b
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert_eq!(feed.metadata.source, FeedSource::Rules);
    assert!(feed.main_cards.iter().all(|c| c.id != "seller-pending-orders"));
}

#[tokio::test]
async fn test_signal_write_on_one_instance_is_seen_by_another() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let instance_a = service_over(store.clone());
    let instance_b = service_over(store.clone());

    let before = instance_b
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert!(before.main_cards.iter().all(|c| c.id != "seller-pending-orders"));

    instance_a
        .lifecycle()
        .set_pending_task("seller-1", "ordersPending", true)
        .await
        .unwrap();

    let after = instance_b
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();
    assert_eq!(after.main_cards[0].id, "seller-pending-orders");
}

// ============================================
// Store failures
// ============================================

#[tokio::test]
async fn test_unreadable_settings_fail_the_feed() {
    let mut store = MockStore::new();
    store
        .expect_get_settings()
        .returning(|_| Err(StoreError::Unavailable("connection refused".to_string())));
    store.expect_load_signal_history().never();

    let service = service_over(Arc::new(store));
    let result = service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await;

    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn test_failed_purge_keeps_settings() {
    let mut store = MockStore::new();
    store
        .expect_get_settings()
        .returning(|_| Ok(PersonalizationSettings::default()));
    store
        .expect_clear_all_signals()
        .times(1)
        .returning(|_| Err(StoreError::Unavailable("timeout".to_string())));
    store.expect_save_settings().never();

    let cache = Arc::new(SignalCache::new(Duration::from_secs(60)));
    let lifecycle = SettingsLifecycle::new(Arc::new(store), cache);

    let result = lifecycle
        .update_settings("seller-1", PersonalizationSettings::disabled())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_visit_write_failure_still_serves_feed() {
    let mut store = MockStore::new();
    store
        .expect_get_settings()
        .returning(|_| Ok(PersonalizationSettings::default()));
    store.expect_signal_generation().returning(|_| Ok(0));
    store
        .expect_load_signal_history()
        .returning(|_| Ok(SignalHistory::default()));
    store
        .expect_record_visit()
        .times(1)
        .returning(|_, _| Err(StoreError::Unavailable("read-only replica".to_string())));

    let service = service_over(Arc::new(store));
    let feed = service
        .feed_for(&seller(), DeviceSignals::default(), now())
        .await
        .unwrap();

    assert_eq!(feed.metadata.source, FeedSource::Rules);
    assert!(!feed.main_cards.is_empty());
}

#[tokio::test]
async fn test_purge_runs_before_save() {
    let mut seq = mockall::Sequence::new();
    let mut store = MockStore::new();
    store
        .expect_get_settings()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(PersonalizationSettings::default()));
    store
        .expect_clear_all_signals()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    store
        .expect_save_settings()
        .withf(|actor, settings| actor.to_string() == "seller-1" && !settings.enabled)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let cache = Arc::new(SignalCache::new(Duration::from_secs(60)));
    let lifecycle = SettingsLifecycle::new(Arc::new(store), cache);

    let change = lifecycle
        .update_settings("seller-1", PersonalizationSettings::disabled())
        .await
        .unwrap();
    assert_eq!(change, SettingsChange::Purged);
}
