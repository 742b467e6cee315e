//! Content catalog
//!
//! Versioned registries of cards, banners and suggestions. A catalog is built
//! once (either the built-in one or a JSON file named by `CATALOG_PATH`),
//! validated, and then shared read-only by every feed request.
//!
//! Lookup rules:
//! - Cards are bucketed by role; an unknown role resolves to `default_role`.
//! - Banner pool = common banners followed by role banners.
//! - Suggestion pool = role suggestions followed by common suggestions. The
//!   position in this concatenation is carried as the pool rank so role
//!   suggestions win ties against common ones.

mod builtin;

use crate::models::{Banner, CatalogItem, ContentCard, ContentFamily, Suggestion};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Duplicate {family} id in catalog: {id}")]
    DuplicateId { family: ContentFamily, id: String },

    #[error("Default role '{0}' has no card bucket")]
    MissingDefaultRole(String),

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog entry together with its position class inside a merged pool
#[derive(Debug, Clone, Copy)]
pub struct PoolEntry<'a, T> {
    pub item: &'a T,
    /// Lower ranks win score ties
    pub pool_rank: u8,
}

impl<'a, T> PoolEntry<'a, T> {
    pub fn new(item: &'a T, pool_rank: u8) -> Self {
        Self { item, pool_rank }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCatalog {
    pub version: String,
    pub default_role: String,
    #[serde(default)]
    pub cards: BTreeMap<String, Vec<ContentCard>>,
    #[serde(default)]
    pub common_banners: Vec<Banner>,
    #[serde(default)]
    pub role_banners: BTreeMap<String, Vec<Banner>>,
    #[serde(default)]
    pub role_suggestions: BTreeMap<String, Vec<Suggestion>>,
    #[serde(default)]
    pub common_suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub default_card_ids: BTreeMap<String, Vec<String>>,
}

static BUILTIN: Lazy<ContentCatalog> = Lazy::new(builtin::catalog);

impl ContentCatalog {
    /// Catalog compiled into the service
    pub fn builtin() -> &'static ContentCatalog {
        &BUILTIN
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: ContentCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&raw)?;
        info!(
            path = %path.as_ref().display(),
            version = %catalog.version,
            "Loaded content catalog"
        );
        Ok(catalog)
    }

    /// Check load-time invariants: ids are unique inside each family and the
    /// default role owns a card bucket.
    pub fn validate(&self) -> Result<()> {
        if !self.cards.contains_key(&self.default_role) {
            return Err(CatalogError::MissingDefaultRole(self.default_role.clone()));
        }

        ensure_unique(self.cards.values().flatten())?;
        ensure_unique(
            self.common_banners
                .iter()
                .chain(self.role_banners.values().flatten()),
        )?;
        ensure_unique(
            self.role_suggestions
                .values()
                .flatten()
                .chain(self.common_suggestions.iter()),
        )?;

        Ok(())
    }

    pub fn is_known_role(&self, role: &str) -> bool {
        self.cards.contains_key(role)
    }

    /// Map an unrecognised role onto the default role bucket
    pub fn resolve_role<'a>(&'a self, role: &'a str) -> &'a str {
        if self.is_known_role(role) {
            role
        } else {
            &self.default_role
        }
    }

    pub fn cards_for(&self, role: &str) -> &[ContentCard] {
        self.cards
            .get(self.resolve_role(role))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn card_by_id(&self, id: &str) -> Option<&ContentCard> {
        self.cards.values().flatten().find(|card| card.id == id)
    }

    pub fn banner_pool(&self, role: &str) -> Vec<PoolEntry<'_, Banner>> {
        let role_banners = self
            .role_banners
            .get(self.resolve_role(role))
            .map(Vec::as_slice)
            .unwrap_or_default();

        self.common_banners
            .iter()
            .chain(role_banners.iter())
            .map(|banner| PoolEntry::new(banner, 0))
            .collect()
    }

    pub fn role_suggestions_for(&self, role: &str) -> &[Suggestion] {
        self.role_suggestions
            .get(self.resolve_role(role))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn suggestion_pool(&self, role: &str) -> Vec<PoolEntry<'_, Suggestion>> {
        self.role_suggestions_for(role)
            .iter()
            .map(|suggestion| PoolEntry::new(suggestion, 0))
            .chain(
                self.common_suggestions
                    .iter()
                    .map(|suggestion| PoolEntry::new(suggestion, 1)),
            )
            .collect()
    }

    /// Fixed card order used when personalization is switched off
    pub fn default_card_ids_for(&self, role: &str) -> &[String] {
        self.default_card_ids
            .get(role)
            .or_else(|| self.default_card_ids.get(&self.default_role))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn ensure_unique<'a, T: CatalogItem + 'a>(items: impl Iterator<Item = &'a T>) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id()) {
            return Err(CatalogError::DuplicateId {
                family: T::FAMILY,
                id: item.id().to_string(),
            });
        }
    }
    Ok(())
}
