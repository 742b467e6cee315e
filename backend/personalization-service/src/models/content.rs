use serde::{Deserialize, Serialize};

/// Content family tag shared by catalog entries, metrics and interaction events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFamily {
    Card,
    Banner,
    Suggestion,
}

impl ContentFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFamily::Card => "card",
            ContentFamily::Banner => "banner",
            ContentFamily::Suggestion => "suggestion",
        }
    }
}

impl std::fmt::Display for ContentFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative gate attached to every catalog entry.
///
/// Every field is optional and an absent field never excludes an item.
/// `priority`, `start_date` and `end_date` are only meaningful on banners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_pending_tasks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days_since_signup: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_first_visit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Inclusive lower bound, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl EligibilityCondition {
    pub fn for_roles(roles: &[&str]) -> Self {
        Self {
            roles: Some(roles.iter().map(|r| r.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn with_pending_tasks(mut self) -> Self {
        self.requires_pending_tasks = Some(true);
        self
    }

    pub fn with_max_days_since_signup(mut self, days: i64) -> Self {
        self.max_days_since_signup = Some(days);
        self
    }

    pub fn with_first_visit(mut self) -> Self {
        self.requires_first_visit = Some(true);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_window(mut self, start: &str, end: &str) -> Self {
        self.start_date = Some(start.to_string());
        self.end_date = Some(end.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAction {
    pub label: String,
    pub url: String,
}

impl ContentAction {
    pub fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

/// Dashboard card shown in the main feed slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCard {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ContentAction>,
    #[serde(default)]
    pub conditions: EligibilityCondition,
    pub base_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerVariant {
    Info,
    Success,
    Warning,
    Promo,
}

/// Notice rendered either as the top notice or in the bottom banner strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub message: String,
    pub variant: BannerVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ContentAction>,
    #[serde(default)]
    pub conditions: EligibilityCondition,
    pub weight: f64,
}

/// Side-panel suggestion link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub conditions: EligibilityCondition,
    pub weight: f64,
}

/// Common view over the three content families so that eligibility and
/// scoring are written once.
pub trait CatalogItem: Clone {
    const FAMILY: ContentFamily;

    fn id(&self) -> &str;

    fn conditions(&self) -> &EligibilityCondition;

    /// Score floor before any boost is applied
    fn base_weight(&self) -> f64;

    /// Secondary sort key, higher first
    fn secondary_priority(&self) -> i32 {
        0
    }
}

impl CatalogItem for ContentCard {
    const FAMILY: ContentFamily = ContentFamily::Card;

    fn id(&self) -> &str {
        &self.id
    }

    fn conditions(&self) -> &EligibilityCondition {
        &self.conditions
    }

    fn base_weight(&self) -> f64 {
        self.base_weight
    }
}

impl CatalogItem for Banner {
    const FAMILY: ContentFamily = ContentFamily::Banner;

    fn id(&self) -> &str {
        &self.id
    }

    fn conditions(&self) -> &EligibilityCondition {
        &self.conditions
    }

    fn base_weight(&self) -> f64 {
        self.weight
    }

    fn secondary_priority(&self) -> i32 {
        self.conditions.priority.unwrap_or(0)
    }
}

impl CatalogItem for Suggestion {
    const FAMILY: ContentFamily = ContentFamily::Suggestion;

    fn id(&self) -> &str {
        &self.id
    }

    fn conditions(&self) -> &EligibilityCondition {
        &self.conditions
    }

    fn base_weight(&self) -> f64 {
        self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_deserializes_from_camel_case() {
        let json = r#"{
            "roles": ["seller"],
            "requiresPendingTasks": true,
            "maxDaysSinceSignup": 7,
            "startDate": "2025-10-28"
        }"#;

        let condition: EligibilityCondition = serde_json::from_str(json).unwrap();

        assert_eq!(condition.roles, Some(vec!["seller".to_string()]));
        assert_eq!(condition.requires_pending_tasks, Some(true));
        assert_eq!(condition.max_days_since_signup, Some(7));
        assert_eq!(condition.start_date.as_deref(), Some("2025-10-28"));
        assert!(condition.end_date.is_none());
        assert!(condition.requires_first_visit.is_none());
    }

    #[test]
    fn test_banner_secondary_priority_defaults_to_zero() {
        let banner = Banner {
            id: "b".to_string(),
            title: "t".to_string(),
            message: "m".to_string(),
            variant: BannerVariant::Info,
            action: None,
            conditions: EligibilityCondition::default(),
            weight: 10.0,
        };
        assert_eq!(banner.secondary_priority(), 0);

        let prioritized = Banner {
            conditions: EligibilityCondition::default().with_priority(7),
            ..banner
        };
        assert_eq!(prioritized.secondary_priority(), 7);
    }

    #[test]
    fn test_family_labels() {
        assert_eq!(ContentFamily::Card.as_str(), "card");
        assert_eq!(
            serde_json::to_string(&ContentFamily::Suggestion).unwrap(),
            "\"suggestion\""
        );
    }
}
