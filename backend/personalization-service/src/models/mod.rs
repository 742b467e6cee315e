pub mod content;
pub mod feed;
pub mod signals;

pub use content::{
    Banner, BannerVariant, CatalogItem, ContentAction, ContentCard, ContentFamily,
    EligibilityCondition, Suggestion,
};
pub use feed::{FeedMetadata, FeedSource, PersonalizationSettings, PersonalizedFeed};
pub use signals::{
    AccountCreatedAt, ActorContext, BehaviorSignals, DeviceSignals, InteractionEvent,
    InteractionKind, StateSignals, UserSignals,
};
