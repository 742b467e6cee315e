pub mod composer;
pub mod eligibility;
pub mod personalization;
pub mod scoring;
pub mod slots;

pub use composer::{default_feed, FeedComposer};
pub use eligibility::{EligibilityBasis, EligibilityContext, EligibilityError, EligibilityFilter};
pub use personalization::PersonalizationService;
pub use scoring::{BoostWeights, RuleTag, ScoredItem, WeightScorer};
pub use slots::{SlotAllocator, SlotLimits};
