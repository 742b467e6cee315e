use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ContentFamily;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSignals {
    /// Named flags of outstanding work items, e.g. `ordersPending`
    #[serde(default)]
    pub pending_tasks: BTreeMap<String, bool>,
}

impl BehaviorSignals {
    pub fn has_pending_tasks(&self) -> bool {
        self.pending_tasks.values().any(|pending| *pending)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSignals {
    #[serde(default)]
    pub is_first_visit: bool,
    /// `None` when the account age is unknown
    #[serde(default)]
    pub days_since_signup: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSignals {
    #[serde(default)]
    pub is_mobile: bool,
}

/// Read-only snapshot of everything the engine knows about one actor at one
/// point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignals {
    #[serde(default)]
    pub behavior: BehaviorSignals,
    #[serde(default)]
    pub state: StateSignals,
    #[serde(default)]
    pub device: DeviceSignals,
}

impl UserSignals {
    /// Snapshot carrying only the device, used when behavior must not be read
    pub fn device_only(device: DeviceSignals) -> Self {
        Self {
            device,
            ..Default::default()
        }
    }
}

/// Account creation instant as handed over by the identity provider.
///
/// Accepts either an RFC 3339 timestamp or any string; strings are parsed on
/// use and anything unparseable counts as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountCreatedAt {
    Timestamp(DateTime<Utc>),
    Raw(String),
}

impl AccountCreatedAt {
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            AccountCreatedAt::Timestamp(at) => Some(*at),
            AccountCreatedAt::Raw(raw) => {
                let raw = raw.trim();
                if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
                    return Some(at.with_timezone(&Utc));
                }
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }
        }
    }

    /// Elapsed days between account creation and `now`, floored, so any
    /// creation instant after `now` yields a negative count.
    pub fn days_since(&self, now: DateTime<Utc>) -> Option<i64> {
        const SECS_PER_DAY: i64 = 86_400;
        self.resolve()
            .map(|created| (now - created).num_seconds().div_euclid(SECS_PER_DAY))
    }
}

/// Identity provider input for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    pub actor_id: String,
    /// Currently active role
    pub role: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub account_created_at: Option<AccountCreatedAt>,
}

impl ActorContext {
    pub fn new(actor_id: &str, role: &str) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            role: role.to_string(),
            roles: vec![role.to_string()],
            account_created_at: None,
        }
    }

    pub fn with_account_created_at(mut self, created: AccountCreatedAt) -> Self {
        self.account_created_at = Some(created);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Impression,
    Click,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Impression => "impression",
            InteractionKind::Click => "click",
        }
    }
}

/// Render-side impression or click on a placed feed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub family: ContentFamily,
    pub item_id: String,
    pub position: u32,
    pub kind: InteractionKind,
    pub at: DateTime<Utc>,
}
