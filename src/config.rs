//! Configuration loading and validation.
//!
//! Configuration comes from a TOML file with serde defaults for every field,
//! plus environment overrides for secrets (`TELEGRAM_BOT_TOKEN`). All
//! durations live here as configuration values; the core never hardcodes a
//! TTL or interval.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::Pair;
use crate::error::{ConfigError, Result};

/// How cache entries are partitioned across subscribers.
///
/// The two modes are materially different consistency models: `global`
/// shares one freshness clock across everyone, `per-subscriber` gives each
/// subscriber its own. A deployment picks one; they are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Global,
    PerSubscriber,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub poller: PollerConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Upstream rates endpoint.
    pub url: String,
    /// Hard bound on one fetch round trip.
    pub fetch_timeout_secs: u64,
    /// Pairs to keep from the upstream response, as `"USD/UAH"` strings.
    pub pairs: Vec<String>,
    /// Delay before the single retry after an upstream rate limit.
    pub rate_limit_retry_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum age at which a cached snapshot may still be served.
    pub ttl_secs: u64,
    pub mode: CacheMode,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Background fetch interval.
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token; the `TELEGRAM_BOT_TOKEN` env var takes precedence.
    pub bot_token: String,
    /// Delay before restarting the command listener transport after it dies.
    pub restart_delay_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed, or
    /// when a value fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults when the file does
    /// not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.source.url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "source.url",
            }
            .into());
        }
        if let Err(e) = url::Url::parse(&self.source.url) {
            return Err(ConfigError::InvalidValue {
                field: "source.url",
                reason: e.to_string(),
            }
            .into());
        }
        if self.source.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.fetch_timeout_secs",
                reason: "must be greater than zero".into(),
            }
            .into());
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.ttl_secs",
                reason: "must be greater than zero".into(),
            }
            .into());
        }
        if self.poller.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poller.interval_secs",
                reason: "must be greater than zero".into(),
            }
            .into());
        }
        // Surface bad pair syntax at startup rather than on first fetch.
        self.source.pair_filter()?;
        Ok(())
    }
}

impl SourceConfig {
    /// Parse the configured pair strings into domain pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unparseable pair.
    pub fn pair_filter(&self) -> Result<Vec<Pair>> {
        self.pairs
            .iter()
            .map(|raw| {
                raw.parse::<Pair>().map_err(|e| {
                    ConfigError::InvalidValue {
                        field: "source.pairs",
                        reason: e.to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }

    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    #[must_use]
    pub const fn rate_limit_retry(&self) -> Duration {
        Duration::from_secs(self.rate_limit_retry_secs)
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl PollerConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl TelegramConfig {
    /// The bot token, with the `TELEGRAM_BOT_TOKEN` env var taking
    /// precedence over the config file.
    #[must_use]
    pub fn resolved_bot_token(&self) -> Option<String> {
        std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| (!self.bot_token.is_empty()).then(|| self.bot_token.clone()))
    }

    #[must_use]
    pub const fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://api.monobank.ua/bank/currency".into(),
            fetch_timeout_secs: 10,
            pairs: vec!["USD/UAH".into(), "EUR/UAH".into()],
            rate_limit_retry_secs: 30,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 900,
            mode: CacheMode::Global,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval_secs: 900 }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            restart_delay_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
