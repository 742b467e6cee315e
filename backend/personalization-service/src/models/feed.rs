use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Banner, ContentCard, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Rules,
    Default,
}

impl FeedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedSource::Rules => "rules",
            FeedSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMetadata {
    pub personalized_at: DateTime<Utc>,
    pub source: FeedSource,
    pub applied_rules: Vec<String>,
}

/// Ordered, slot-bounded output for one page render. Index equals rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedFeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_notice: Option<Banner>,
    pub main_cards: Vec<ContentCard>,
    pub suggestions: Vec<Suggestion>,
    pub bottom_banners: Vec<Banner>,
    pub metadata: FeedMetadata,
}

/// Per-actor personalization switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationSettings {
    pub enabled: bool,
    pub collect_behavior: bool,
    pub show_recommendations: bool,
}

impl Default for PersonalizationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            collect_behavior: true,
            show_recommendations: true,
        }
    }
}

impl PersonalizationSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Behavior may be written only while both switches are on
    pub fn allows_collection(&self) -> bool {
        self.enabled && self.collect_behavior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_serializes_camel_case_without_absent_notice() {
        let feed = PersonalizedFeed {
            top_notice: None,
            main_cards: vec![],
            suggestions: vec![],
            bottom_banners: vec![],
            metadata: FeedMetadata {
                personalized_at: Utc::now(),
                source: FeedSource::Default,
                applied_rules: vec!["default-fallback".to_string()],
            },
        };

        let value = serde_json::to_value(&feed).unwrap();
        assert!(value.get("topNotice").is_none());
        assert!(value.get("mainCards").is_some());
        assert!(value.get("bottomBanners").is_some());
        assert_eq!(value["metadata"]["source"], "default");
        assert_eq!(value["metadata"]["appliedRules"][0], "default-fallback");
    }

    #[test]
    fn test_settings_collection_gate() {
        assert!(PersonalizationSettings::default().allows_collection());
        assert!(!PersonalizationSettings::disabled().allows_collection());

        let no_collect = PersonalizationSettings {
            collect_behavior: false,
            ..Default::default()
        };
        assert!(!no_collect.allows_collection());
    }
}
