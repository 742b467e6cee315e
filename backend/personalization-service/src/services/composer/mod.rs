// ============================================
// Feed Composer
// ============================================
//
// Pipeline per content family: Pool → Eligibility → Score → Rank → Slot trim
//
// - Cards: role bucket (unknown role → default bucket), top `mainFeedCount`
// - Banners: common ∪ role; first ranked banner becomes the top notice and
//   the next `bottomBannerMaxCount` fill the bottom strip
// - Suggestions: role ∪ common (role ahead on ties), top `suggestionsCount`
//
// Disabled settings short-circuit to the default feed. A malformed catalog
// item is dropped on its own and never aborts the feed.

pub mod fallback;

pub use fallback::{default_feed, DEFAULT_SUGGESTION_COUNT};

use super::eligibility::{EligibilityContext, EligibilityFilter};
use super::scoring::{RuleTag, ScoredItem, WeightScorer};
use super::slots::SlotAllocator;
use crate::catalog::{ContentCatalog, PoolEntry};
use crate::metrics;
use crate::models::{
    CatalogItem, FeedMetadata, FeedSource, PersonalizationSettings, PersonalizedFeed, UserSignals,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct FeedComposer {
    filter: EligibilityFilter,
    scorer: WeightScorer,
    slots: SlotAllocator,
}

impl FeedComposer {
    pub fn new(scorer: WeightScorer, slots: SlotAllocator) -> Self {
        Self {
            filter: EligibilityFilter::new(),
            scorer,
            slots,
        }
    }

    pub fn slots(&self) -> &SlotAllocator {
        &self.slots
    }

    pub fn compose_feed(
        &self,
        role: &str,
        signals: &UserSignals,
        catalog: &ContentCatalog,
        settings: &PersonalizationSettings,
        now: DateTime<Utc>,
    ) -> PersonalizedFeed {
        let limits = self.slots.slots_for(&signals.device);

        if !settings.enabled {
            metrics::record_feed_composed(FeedSource::Default.as_str());
            return default_feed(role, catalog, &limits, now);
        }

        let role = catalog.resolve_role(role);
        let ctx = EligibilityContext::new(role, signals, now);

        let main_cards: Vec<_> = self
            .rank_pool(
                catalog.cards_for(role).iter().map(|card| PoolEntry::new(card, 0)),
                &ctx,
            )
            .into_iter()
            .take(limits.main_feed_count)
            .collect();

        // The top notice is consumed from the ranked list, never duplicated
        let mut ranked_banners = self.rank_pool(catalog.banner_pool(role), &ctx).into_iter();
        let top_notice = ranked_banners.next();
        let bottom_banners: Vec<_> = ranked_banners
            .take(limits.bottom_banner_max_count)
            .collect();

        let suggestions: Vec<_> = if settings.show_recommendations {
            self.rank_pool(catalog.suggestion_pool(role), &ctx)
                .into_iter()
                .take(limits.suggestions_count)
                .collect()
        } else {
            Vec::new()
        };

        let mut trail = RuleTrail::default();
        trail.observe(&main_cards);
        trail.observe(top_notice.as_slice());
        trail.observe(&bottom_banners);
        trail.observe(&suggestions);

        debug!(
            role = role,
            is_mobile = signals.device.is_mobile,
            cards = main_cards.len(),
            has_top_notice = top_notice.is_some(),
            bottom_banners = bottom_banners.len(),
            suggestions = suggestions.len(),
            "Rules feed composed"
        );
        metrics::record_feed_composed(FeedSource::Rules.as_str());

        PersonalizedFeed {
            top_notice: top_notice.map(|scored| scored.item.clone()),
            main_cards: main_cards.into_iter().map(|s| s.item.clone()).collect(),
            suggestions: suggestions.into_iter().map(|s| s.item.clone()).collect(),
            bottom_banners: bottom_banners.into_iter().map(|s| s.item.clone()).collect(),
            metadata: FeedMetadata {
                personalized_at: now,
                source: FeedSource::Rules,
                applied_rules: trail.into_strings(),
            },
        }
    }

    /// Filter, score and rank one pool. Items whose evaluation fails are
    /// logged and left out.
    fn rank_pool<'a, T: CatalogItem + 'a>(
        &self,
        pool: impl IntoIterator<Item = PoolEntry<'a, T>>,
        ctx: &EligibilityContext<'_>,
    ) -> Vec<ScoredItem<'a, T>> {
        let mut scored = Vec::new();

        for entry in pool {
            match self.filter.evaluate(entry.item, ctx) {
                Ok(Some(basis)) => scored.push(self.scorer.score_entry(entry, &basis)),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        family = T::FAMILY.as_str(),
                        item_id = entry.item.id(),
                        error = %e,
                        "Skipping catalog item with invalid condition"
                    );
                    metrics::record_item_skipped(T::FAMILY.as_str());
                }
            }
        }

        self.scorer.rank(&mut scored);
        scored
    }
}

/// Union of rule tags in first-seen order
#[derive(Debug, Default)]
struct RuleTrail {
    tags: Vec<RuleTag>,
}

impl RuleTrail {
    fn observe<T>(&mut self, items: &[ScoredItem<'_, T>]) {
        for tag in items.iter().flat_map(|scored| scored.rules.iter()) {
            if !self.tags.contains(tag) {
                self.tags.push(*tag);
            }
        }
    }

    fn into_strings(self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.as_str().to_string()).collect()
    }
}
