pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod store;

pub use catalog::ContentCatalog;
pub use config::Config;
pub use error::AppError;
pub use lifecycle::{SettingsChange, SettingsLifecycle};
pub use services::{FeedComposer, PersonalizationService};
pub use store::{InMemoryPreferenceStore, PreferenceStore, RedisPreferenceStore};

use signals::{SignalCache, StoreSignalCollector};
use std::sync::Arc;
use std::time::Duration;

/// Wire catalog, store and tuning knobs into a ready service
pub fn build_service(
    config: &Config,
    catalog: ContentCatalog,
    store: Arc<dyn PreferenceStore>,
) -> PersonalizationService {
    let cache = Arc::new(SignalCache::with_limits(
        Duration::from_secs(config.signals.cache_ttl_secs),
        config.signals.cache_max_entries,
    ));

    let collector = StoreSignalCollector::new(store.clone(), cache.clone()).with_first_visit_window(
        chrono::Duration::minutes(config.signals.first_visit_window_minutes),
    );
    let lifecycle = SettingsLifecycle::new(store, cache);
    let composer = FeedComposer::new(
        services::WeightScorer::with_boosts(config.boosts),
        config.slots,
    );

    PersonalizationService::new(
        Arc::new(catalog),
        composer,
        Arc::new(collector),
        Arc::new(lifecycle),
    )
}
