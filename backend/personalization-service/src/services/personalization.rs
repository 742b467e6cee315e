use super::composer::FeedComposer;
use crate::catalog::ContentCatalog;
use crate::lifecycle::SettingsLifecycle;
use crate::models::{ActorContext, DeviceSignals, PersonalizedFeed, UserSignals};
use crate::signals::SignalCollector;
use crate::store::StoreResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Request-level entry point: settings → signals → composed feed
pub struct PersonalizationService {
    catalog: Arc<ContentCatalog>,
    composer: FeedComposer,
    collector: Arc<dyn SignalCollector>,
    lifecycle: Arc<SettingsLifecycle>,
}

impl PersonalizationService {
    pub fn new(
        catalog: Arc<ContentCatalog>,
        composer: FeedComposer,
        collector: Arc<dyn SignalCollector>,
        lifecycle: Arc<SettingsLifecycle>,
    ) -> Self {
        Self {
            catalog,
            composer,
            collector,
            lifecycle,
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn lifecycle(&self) -> &Arc<SettingsLifecycle> {
        &self.lifecycle
    }

    /// Compose the feed for one request.
    ///
    /// A settings read failure is returned as-is; guessing the enabled state
    /// could leak purged behavior into ranking.
    pub async fn feed_for(
        &self,
        actor: &ActorContext,
        device: DeviceSignals,
        now: DateTime<Utc>,
    ) -> StoreResult<PersonalizedFeed> {
        let settings = self.lifecycle.settings(&actor.actor_id).await?;

        if !settings.enabled {
            // Signals are never read for a disabled actor
            return Ok(self.composer.compose_feed(
                &actor.role,
                &UserSignals::device_only(device),
                &self.catalog,
                &settings,
                now,
            ));
        }

        let signals = self.collector.collect(actor, device, now).await?;
        let feed = self
            .composer
            .compose_feed(&actor.role, &signals, &self.catalog, &settings, now);

        if settings.collect_behavior {
            if let Err(e) = self.lifecycle.record_visit(&actor.actor_id, now).await {
                warn!(actor_id = %actor.actor_id, error = %e, "Failed to record visit");
            }
        }

        info!(
            actor_id = %actor.actor_id,
            role = %actor.role,
            source = feed.metadata.source.as_str(),
            cards = feed.main_cards.len(),
            rules = ?feed.metadata.applied_rules,
            "Feed served"
        );

        Ok(feed)
    }
}
