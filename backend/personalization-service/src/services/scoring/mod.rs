// ============================================
// Weight Scorer
// ============================================
//
// score = base weight + Σ boosts for the gated checks that admitted the item.
// Boosts are per item and never touch another item's score. With the default
// (zero) boost weights ordering comes purely from catalog base weights.
//
// Total order:
//   score desc → secondary priority desc → pool rank asc → id asc

use super::eligibility::EligibilityBasis;
use crate::catalog::PoolEntry;
use crate::models::CatalogItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Named rule recorded in feed metadata when it influenced placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleTag {
    #[serde(rename = "urgent-tasks-first")]
    UrgentTasksFirst,
    #[serde(rename = "onboarding-boost")]
    OnboardingBoost,
    #[serde(rename = "first-visit-priority")]
    FirstVisitPriority,
    #[serde(rename = "default-fallback")]
    DefaultFallback,
}

impl RuleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleTag::UrgentTasksFirst => "urgent-tasks-first",
            RuleTag::OnboardingBoost => "onboarding-boost",
            RuleTag::FirstVisitPriority => "first-visit-priority",
            RuleTag::DefaultFallback => "default-fallback",
        }
    }
}

impl std::fmt::Display for RuleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EligibilityBasis {
    /// Rule tags attributable to this basis, in a fixed order
    pub fn rule_tags(&self) -> Vec<RuleTag> {
        let mut tags = Vec::new();
        if self.pending_tasks {
            tags.push(RuleTag::UrgentTasksFirst);
        }
        if self.recency {
            tags.push(RuleTag::OnboardingBoost);
        }
        if self.first_visit {
            tags.push(RuleTag::FirstVisitPriority);
        }
        tags
    }
}

/// Additive boost per eligibility basis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostWeights {
    pub urgent_tasks: f64,
    pub onboarding: f64,
    pub first_visit: f64,
}

impl Default for BoostWeights {
    fn default() -> Self {
        Self {
            urgent_tasks: 0.0,
            onboarding: 0.0,
            first_visit: 0.0,
        }
    }
}

/// Eligible item with its final score and attribution
#[derive(Debug, Clone)]
pub struct ScoredItem<'a, T> {
    pub item: &'a T,
    pub score: f64,
    pub pool_rank: u8,
    pub rules: Vec<RuleTag>,
}

#[derive(Debug, Clone, Default)]
pub struct WeightScorer {
    boosts: BoostWeights,
}

impl WeightScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boosts(boosts: BoostWeights) -> Self {
        Self { boosts }
    }

    pub fn boosts(&self) -> &BoostWeights {
        &self.boosts
    }

    pub fn score<T: CatalogItem>(&self, item: &T, basis: &EligibilityBasis) -> f64 {
        let mut score = item.base_weight();
        if basis.pending_tasks {
            score += self.boosts.urgent_tasks;
        }
        if basis.recency {
            score += self.boosts.onboarding;
        }
        if basis.first_visit {
            score += self.boosts.first_visit;
        }
        score
    }

    pub fn score_entry<'a, T: CatalogItem>(
        &self,
        entry: PoolEntry<'a, T>,
        basis: &EligibilityBasis,
    ) -> ScoredItem<'a, T> {
        ScoredItem {
            item: entry.item,
            score: self.score(entry.item, basis),
            pool_rank: entry.pool_rank,
            rules: basis.rule_tags(),
        }
    }

    /// Sort scored items into their final rank order
    pub fn rank<T: CatalogItem>(&self, items: &mut [ScoredItem<'_, T>]) {
        items.sort_by(compare_ranked);
    }
}

fn compare_ranked<T: CatalogItem>(a: &ScoredItem<'_, T>, b: &ScoredItem<'_, T>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| {
            b.item
                .secondary_priority()
                .cmp(&a.item.secondary_priority())
        })
        .then_with(|| a.pool_rank.cmp(&b.pool_rank))
        .then_with(|| a.item.id().cmp(b.item.id()))
}
