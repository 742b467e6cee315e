//! Default feed used while personalization is switched off.
//!
//! Deterministic and signal-free: a fixed per-role card order, no banners and
//! the first few suggestions in catalog order (unscored).

use crate::catalog::ContentCatalog;
use crate::models::{FeedMetadata, FeedSource, PersonalizedFeed};
use crate::services::scoring::RuleTag;
use crate::services::slots::SlotLimits;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Suggestions shown by the default feed
pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

pub fn default_feed(
    role: &str,
    catalog: &ContentCatalog,
    limits: &SlotLimits,
    now: DateTime<Utc>,
) -> PersonalizedFeed {
    let card_ids = catalog.default_card_ids_for(role);

    // Ids missing from the catalog are dropped silently
    let main_cards: Vec<_> = card_ids
        .iter()
        .filter_map(|id| catalog.card_by_id(id))
        .take(limits.main_feed_count)
        .cloned()
        .collect();

    let suggestions: Vec<_> = catalog
        .role_suggestions_for(role)
        .iter()
        .chain(catalog.common_suggestions.iter())
        .take(DEFAULT_SUGGESTION_COUNT)
        .cloned()
        .collect();

    debug!(
        role = role,
        cards = main_cards.len(),
        unresolved = card_ids.len().saturating_sub(main_cards.len()),
        suggestions = suggestions.len(),
        "Default feed assembled"
    );

    PersonalizedFeed {
        top_notice: None,
        main_cards,
        suggestions,
        bottom_banners: Vec::new(),
        metadata: FeedMetadata {
            personalized_at: now,
            source: FeedSource::Default,
            applied_rules: vec![RuleTag::DefaultFallback.as_str().to_string()],
        },
    }
}
