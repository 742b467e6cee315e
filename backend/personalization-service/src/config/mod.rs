use crate::services::scoring::BoostWeights;
use crate::services::slots::{SlotAllocator, SlotLimits};
use crate::signals::cache::DEFAULT_MAX_ENTRIES;
use crate::signals::DEFAULT_FIRST_VISIT_WINDOW_MINUTES;

/// One day; longer TTLs serve stale signals for no benefit
const MAX_CACHE_TTL_SECS: u64 = 86_400;
/// One week
const MAX_FIRST_VISIT_WINDOW_MINUTES: i64 = 10_080;
const MAX_CACHE_ENTRIES: usize = 1_000_000;
use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("REDIS_URL is required when STORE_BACKEND=redis")]
    MissingRedisUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub catalog: CatalogConfig,
    pub slots: SlotAllocator,
    pub boosts: BoostWeights,
    pub signals: SignalConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// JSON catalog; the built-in catalog is used when unset
    pub path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignalConfig {
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
    pub first_visit_window_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let store = StoreConfig {
            backend: vars.parse_or("STORE_BACKEND", StoreBackend::Memory)?,
            redis_url: vars.get("REDIS_URL"),
        };
        if store.backend == StoreBackend::Redis && store.redis_url.is_none() {
            return Err(ConfigError::MissingRedisUrl);
        }

        let desktop = SlotLimits {
            main_feed_count: vars
                .parse_or("SLOTS_DESKTOP_MAIN", SlotLimits::DESKTOP.main_feed_count)?,
            bottom_banner_max_count: vars.parse_or(
                "SLOTS_DESKTOP_BANNERS",
                SlotLimits::DESKTOP.bottom_banner_max_count,
            )?,
            suggestions_count: vars.parse_or(
                "SLOTS_DESKTOP_SUGGESTIONS",
                SlotLimits::DESKTOP.suggestions_count,
            )?,
        };
        let mobile = SlotLimits {
            main_feed_count: vars.parse_or("SLOTS_MOBILE_MAIN", SlotLimits::MOBILE.main_feed_count)?,
            bottom_banner_max_count: vars.parse_or(
                "SLOTS_MOBILE_BANNERS",
                SlotLimits::MOBILE.bottom_banner_max_count,
            )?,
            suggestions_count: vars.parse_or(
                "SLOTS_MOBILE_SUGGESTIONS",
                SlotLimits::MOBILE.suggestions_count,
            )?,
        };

        let boosts = BoostWeights {
            urgent_tasks: vars.parse_weight("BOOST_URGENT_TASKS")?,
            onboarding: vars.parse_weight("BOOST_ONBOARDING")?,
            first_visit: vars.parse_weight("BOOST_FIRST_VISIT")?,
        };

        let signals = SignalConfig {
            cache_ttl_secs: vars.parse_in_range(
                "SIGNAL_CACHE_TTL_SECS",
                30,
                0..=MAX_CACHE_TTL_SECS,
            )?,
            cache_max_entries: vars.parse_in_range(
                "SIGNAL_CACHE_MAX_ENTRIES",
                DEFAULT_MAX_ENTRIES,
                1..=MAX_CACHE_ENTRIES,
            )?,
            first_visit_window_minutes: vars.parse_in_range(
                "FIRST_VISIT_WINDOW_MINUTES",
                DEFAULT_FIRST_VISIT_WINDOW_MINUTES,
                0..=MAX_FIRST_VISIT_WINDOW_MINUTES,
            )?,
        };

        Ok(Config {
            app: AppConfig {
                env: vars.get("APP_ENV").unwrap_or_else(|| "development".to_string()),
                port: vars.parse_or("APP_PORT", 8080)?,
            },
            store,
            catalog: CatalogConfig {
                path: vars.get("CATALOG_PATH"),
            },
            slots: SlotAllocator::new(desktop, mobile),
            boosts,
            signals,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn parse_in_range<T>(
        &self,
        name: &'static str,
        default: T,
        range: RangeInclusive<T>,
    ) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Display,
        T::Err: Display,
    {
        let value = self.parse_or(name, default)?;
        if !range.contains(&value) {
            return Err(ConfigError::InvalidValue {
                name,
                value: value.to_string(),
                reason: format!("must be between {} and {}", range.start(), range.end()),
            });
        }
        Ok(value)
    }

    fn parse_weight(&self, name: &'static str) -> Result<f64, ConfigError> {
        let weight: f64 = self.parse_or(name, 0.0)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::InvalidValue {
                name,
                value: weight.to_string(),
                reason: "boost must be a finite non-negative number".to_string(),
            });
        }
        Ok(weight)
    }
}
