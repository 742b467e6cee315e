// ============================================
// Eligibility Filter
// ============================================
//
// Decides whether one catalog item may be shown for a signal snapshot.
// All checks are AND-combined and an absent check is vacuously true:
// - Role: active role must be listed when `roles` is non-empty
// - Pending tasks: at least one `true` flag in behavior.pendingTasks
// - Recency: daysSinceSignup <= maxDaysSinceSignup (unknown/negative age fails)
// - First visit: state.isFirstVisit must be set
// - Activation window: now (UTC calendar day) within [startDate, endDate]
//
// Malformed window dates leave that side unbounded. Structural catalog
// defects surface as `EligibilityError` and the caller drops the item.

use crate::models::{CatalogItem, EligibilityCondition, UserSignals};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq)]
pub enum EligibilityError {
    #[error("Item {id} has invalid weight {weight}")]
    InvalidWeight { id: String, weight: f64 },

    #[error("Item {id} has negative maxDaysSinceSignup {days}")]
    InvalidSignupLimit { id: String, days: i64 },

    #[error("Item {id} has inverted activation window {start}..{end}")]
    InvertedWindow {
        id: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, EligibilityError>;

/// Which gated checks admitted an item. Drives rule attribution and boosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EligibilityBasis {
    pub pending_tasks: bool,
    pub recency: bool,
    pub first_visit: bool,
}

/// Inputs shared by every evaluation within one feed computation
#[derive(Debug, Clone, Copy)]
pub struct EligibilityContext<'a> {
    pub role: &'a str,
    pub signals: &'a UserSignals,
    pub now: DateTime<Utc>,
}

impl<'a> EligibilityContext<'a> {
    pub fn new(role: &'a str, signals: &'a UserSignals, now: DateTime<Utc>) -> Self {
        Self { role, signals, now }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityFilter;

impl EligibilityFilter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one item.
    ///
    /// Returns `Ok(Some(basis))` when eligible, `Ok(None)` when a check
    /// excludes it and `Err` when the item itself is malformed.
    pub fn evaluate<T: CatalogItem>(
        &self,
        item: &T,
        ctx: &EligibilityContext<'_>,
    ) -> Result<Option<EligibilityBasis>> {
        let weight = item.base_weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(EligibilityError::InvalidWeight {
                id: item.id().to_string(),
                weight,
            });
        }

        let conditions = item.conditions();
        let mut basis = EligibilityBasis::default();

        if !role_matches(conditions, ctx.role) {
            return Ok(None);
        }

        if conditions.requires_pending_tasks.unwrap_or(false) {
            if !ctx.signals.behavior.has_pending_tasks() {
                return Ok(None);
            }
            basis.pending_tasks = true;
        }

        if let Some(max_days) = conditions.max_days_since_signup {
            if max_days < 0 {
                return Err(EligibilityError::InvalidSignupLimit {
                    id: item.id().to_string(),
                    days: max_days,
                });
            }
            match ctx.signals.state.days_since_signup {
                Some(days) if days >= 0 && days <= max_days => basis.recency = true,
                _ => return Ok(None),
            }
        }

        if conditions.requires_first_visit.unwrap_or(false) {
            if !ctx.signals.state.is_first_visit {
                return Ok(None);
            }
            basis.first_visit = true;
        }

        if !within_window(item.id(), conditions, ctx.now)? {
            return Ok(None);
        }

        Ok(Some(basis))
    }

    /// Boolean view of `evaluate`; malformed items are never eligible.
    pub fn is_eligible<T: CatalogItem>(
        &self,
        item: &T,
        signals: &UserSignals,
        role: &str,
        now: DateTime<Utc>,
    ) -> bool {
        matches!(
            self.evaluate(item, &EligibilityContext::new(role, signals, now)),
            Ok(Some(_))
        )
    }
}

fn role_matches(conditions: &EligibilityCondition, role: &str) -> bool {
    match conditions.roles.as_deref() {
        Some(roles) if !roles.is_empty() => roles.iter().any(|r| r == role),
        _ => true,
    }
}

fn within_window(id: &str, conditions: &EligibilityCondition, now: DateTime<Utc>) -> Result<bool> {
    let start = parse_bound(id, "startDate", conditions.start_date.as_deref());
    let end = parse_bound(id, "endDate", conditions.end_date.as_deref());

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(EligibilityError::InvertedWindow {
                id: id.to_string(),
                start,
                end,
            });
        }
    }

    let today = now.date_naive();
    let after_start = start.map_or(true, |start| today >= start);
    let before_end = end.map_or(true, |end| today <= end);

    Ok(after_start && before_end)
}

/// Parse an ISO calendar date, also accepting a full RFC 3339 timestamp.
/// Unparseable input yields `None`, i.e. no bound on that side.
fn parse_bound(id: &str, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc).date_naive());
    }

    warn!(
        item_id = id,
        field = field,
        value = raw,
        "Malformed activation date, treating bound as open"
    );
    None
}
