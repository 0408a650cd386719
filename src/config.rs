use crate::error::SettingsError;
use crate::models::WatchlistEntry;
use crate::risk::RiskLimits;
use crate::strategy::StrategySettings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "SENTIBOT";

// Default watchlist, processed in this order
const DEFAULT_WATCHLIST: &[(&str, &str)] = &[
    ("AAPL", "Apple"),
    ("JNJ", "Johnson & Johnson"),
    ("XOM", "Exxon Mobil"),
    ("JPM", "JPMorgan Chase"),
    ("PG", "Procter & Gamble"),
    ("BA", "Boeing"),
    ("NVDA", "NVIDIA"),
    ("HD", "Home Depot"),
    ("KO", "Coca-Cola"),
    ("PFE", "Pfizer"),
    ("CVX", "Chevron"),
    ("V", "Visa"),
    ("TSLA", "Tesla"),
    ("META", "Meta Platforms"),
    ("MSFT", "Microsoft"),
    ("UNH", "UnitedHealth Group"),
    ("CAT", "Caterpillar"),
    ("WMT", "Walmart"),
    ("T", "AT&T"),
];

/// Process-wide configuration, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub news: NewsSettings,
    pub risk: RiskLimits,
    pub strategy: StrategySettings,
    pub cycle: CycleSettings,
    pub watchlist: Vec<WatchlistEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings::default(),
            news: NewsSettings::default(),
            risk: RiskLimits::default(),
            strategy: StrategySettings::default(),
            cycle: CycleSettings::default(),
            watchlist: default_watchlist(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    pub key_id: String,
    pub secret_key: String,
    pub trading_url: String,
    pub data_url: String,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            secret_key: String::new(),
            trading_url: "https://paper-api.alpaca.markets".to_string(),
            data_url: "https://data.alpaca.markets".to_string(),
        }
    }
}

impl BrokerSettings {
    pub fn has_credentials(&self) -> bool {
        !self.key_id.is_empty() && !self.secret_key.is_empty()
    }
}

impl fmt::Debug for BrokerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerSettings")
            .field("key_id", &self.key_id)
            .field("secret_key", &"<redacted>")
            .field("trading_url", &self.trading_url)
            .field("data_url", &self.data_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub base_url: String,
    pub headline_limit: usize,
    pub requests_per_minute: u32,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://news.google.com".to_string(),
            headline_limit: 15,
            requests_per_minute: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleSettings {
    /// Minimum gap between two order submissions
    pub order_pause_ms: u64,
    /// Upper bound on any single collaborator call
    pub call_timeout_secs: u64,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            order_pause_ms: 2_000,
            call_timeout_secs: 15,
        }
    }
}

impl CycleSettings {
    pub fn order_pause(&self) -> Duration {
        Duration::from_millis(self.order_pause_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

fn default_watchlist() -> Vec<WatchlistEntry> {
    DEFAULT_WATCHLIST
        .iter()
        .map(|(symbol, name)| WatchlistEntry::new(*symbol, *name))
        .collect()
}

impl Settings {
    /// Layer defaults, an optional TOML file, `SENTIBOT_*` env vars and the
    /// `ALPACA_KEY` / `ALPACA_SECRET` credentials, lowest precedence first.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("broker.key_id", std::env::var("ALPACA_KEY").ok())?
            .set_override_option("broker.secret_key", std::env::var("ALPACA_SECRET").ok())?
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Checks that cannot be expressed in the types
    pub fn validate(&self, require_credentials: bool) -> Result<(), SettingsError> {
        self.risk.validate().map_err(SettingsError::Invalid)?;

        if !self.strategy.sell_threshold.is_finite() {
            return Err(SettingsError::Invalid(
                "sell_threshold must be finite".to_string(),
            ));
        }

        if self.strategy.ranges_overlap() {
            tracing::warn!(
                "Sell threshold {} overlaps the lowest buy threshold; held positions will be sold first",
                self.strategy.sell_threshold
            );
        }

        if self.watchlist.is_empty() {
            return Err(SettingsError::Invalid("watchlist is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for entry in &self.watchlist {
            if entry.symbol.trim().is_empty() || entry.name.trim().is_empty() {
                return Err(SettingsError::Invalid(format!(
                    "watchlist entry {:?} needs both a symbol and a name",
                    entry
                )));
            }
            if !seen.insert(entry.symbol.as_str()) {
                return Err(SettingsError::Invalid(format!(
                    "duplicate watchlist symbol {}",
                    entry.symbol
                )));
            }
        }

        if self.news.headline_limit == 0 {
            return Err(SettingsError::Invalid(
                "news.headline_limit must be positive".to_string(),
            ));
        }
        if self.news.requests_per_minute == 0 {
            return Err(SettingsError::Invalid(
                "news.requests_per_minute must be positive".to_string(),
            ));
        }
        if self.cycle.call_timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "cycle.call_timeout_secs must be positive".to_string(),
            ));
        }

        if require_credentials && !self.broker.has_credentials() {
            return Err(SettingsError::Invalid(
                "broker credentials missing (set ALPACA_KEY and ALPACA_SECRET)".to_string(),
            ));
        }

        Ok(())
    }
}
