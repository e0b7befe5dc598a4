//! Configuration keys, the optional TOML file, and value precedence.
//!
//! Every value is resolved as: explicit value (command line, then config file),
//! then environment, then the built-in default.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use url::Url;

use crate::message::{Era, EraTable};
use crate::schedule::{CollectionScheduleCalculator, MonthOverride, OverrideTable};
use crate::window::{DEFAULT_EVENING_HOUR, DEFAULT_MORNING_HOUR, NotificationWindow};

/// Value stored for the webhook URL until someone configures a real one.
pub const PLACEHOLDER_WEBHOOK_URL: &str = "YOUR_DISCORD_WEBHOOK_URL_HERE";
/// Every Discord webhook URL starts with this prefix.
pub const DISCORD_WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";
/// Pause between successive digest messages.
pub const DEFAULT_DIGEST_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading or validating configuration.
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// An override entry names a date that does not exist.
    #[error("Invalid override {year}-{month:02}-{day:02}: no such date")]
    InvalidOverride {
        /// Year of the entry.
        year: i32,
        /// Month of the entry.
        month: u32,
        /// Day of the entry.
        day: u32,
    },
    /// An hour outside 0-23.
    #[error("Invalid hour: {0}")]
    InvalidHour(u32),
    /// The morning hour does not precede the evening hour.
    #[error("Morning hour {morning_hour} must be before evening hour {evening_hour}")]
    InvertedWindow {
        /// Configured morning hour.
        morning_hour: u32,
        /// Configured evening hour.
        evening_hour: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Environment keys recognized by gomibi.
pub enum ConfigKey {
    /// Discord webhook endpoint.
    DiscordWebhookUrl,
    /// Path of the optional TOML config file.
    ConfigPath,
}

impl ConfigKey {
    /// Every recognized key.
    pub const ALL: [ConfigKey; 2] = [ConfigKey::DiscordWebhookUrl, ConfigKey::ConfigPath];

    /// Environment variable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::DiscordWebhookUrl => "DISCORD_WEBHOOK_URL",
            ConfigKey::ConfigPath => "GOMIBI_CONFIG",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Read a key from the process environment.
#[must_use]
pub fn process_env(key: ConfigKey) -> Option<String> {
    std::env::var(key.as_str()).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where notifications go.
pub enum WebhookTarget {
    /// Nothing configured yet. Sending is skipped.
    Unconfigured,
    /// Configured, but not a Discord webhook URL.
    Invalid(String),
    /// Ready to post to.
    Endpoint(Url),
}

impl WebhookTarget {
    /// Classify a raw configured value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == PLACEHOLDER_WEBHOOK_URL {
            return WebhookTarget::Unconfigured;
        }
        if !raw.starts_with(DISCORD_WEBHOOK_PREFIX) {
            return WebhookTarget::Invalid(raw.to_owned());
        }
        Url::parse(raw).map_or_else(
            |_err| WebhookTarget::Invalid(raw.to_owned()),
            WebhookTarget::Endpoint,
        )
    }

    /// Whether the target can be posted to.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        matches!(self, WebhookTarget::Endpoint(_))
    }
}

impl fmt::Display for WebhookTarget {
    // Webhook URLs embed their token, so only the host is shown.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookTarget::Unconfigured => write!(formatter, "not configured"),
            WebhookTarget::Invalid(_) => write!(formatter, "invalid webhook URL"),
            WebhookTarget::Endpoint(url) => write!(
                formatter,
                "{}://{}/…",
                url.scheme(),
                url.host_str().unwrap_or_default()
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
/// Contents of the optional TOML config file.
pub struct FileConfig {
    /// Discord webhook endpoint.
    pub webhook_url: Option<String>,
    /// Last hour that notifies about today.
    pub morning_hour: Option<u32>,
    /// First hour that notifies about tomorrow.
    pub evening_hour: Option<u32>,
    /// Pause between digest messages in milliseconds.
    pub digest_interval_ms: Option<u64>,
    /// Replaces the built-in override table when present.
    pub overrides: Option<Vec<MonthOverride>>,
    /// Replaces the built-in era table when present.
    pub eras: Option<Vec<Era>>,
}

impl FileConfig {
    /// Parse config file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, or
    /// [`ConfigError::Parse`] when it is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Pick the config file path: explicit path first, then `GOMIBI_CONFIG`.
#[must_use]
pub fn config_path(
    explicit: Option<PathBuf>,
    env: impl Fn(ConfigKey) -> Option<String>,
) -> Option<PathBuf> {
    explicit.or_else(|| {
        env(ConfigKey::ConfigPath)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    })
}

#[derive(Debug, Clone)]
/// Fully resolved runtime settings.
pub struct Settings {
    /// Where notifications go.
    pub webhook: WebhookTarget,
    /// Hours deciding between today and tomorrow.
    pub window: NotificationWindow,
    /// Months whose non-burnable collection moved.
    pub overrides: OverrideTable,
    /// Reference documents per era.
    pub eras: EraTable,
    /// Pause between digest messages.
    pub digest_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook: WebhookTarget::Unconfigured,
            window: NotificationWindow::default(),
            overrides: OverrideTable::saga_default(),
            eras: EraTable::saga_default(),
            digest_interval: DEFAULT_DIGEST_INTERVAL,
        }
    }
}

impl Settings {
    /// Resolve settings from a config file, an explicit webhook URL, and the environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the window hours or an override entry are invalid.
    pub fn resolve(
        file: FileConfig,
        explicit_webhook: Option<&str>,
        env: impl Fn(ConfigKey) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |value: &String| !value.trim().is_empty();

        let raw_webhook = explicit_webhook
            .map(str::to_owned)
            .filter(non_empty)
            .or(file.webhook_url.filter(non_empty))
            .or_else(|| env(ConfigKey::DiscordWebhookUrl).filter(non_empty))
            .unwrap_or_else(|| PLACEHOLDER_WEBHOOK_URL.to_owned());

        let window = NotificationWindow::new(
            file.morning_hour.unwrap_or(DEFAULT_MORNING_HOUR),
            file.evening_hour.unwrap_or(DEFAULT_EVENING_HOUR),
        )?;

        let overrides = match file.overrides {
            Some(entries) => validated_overrides(entries)?,
            None => OverrideTable::saga_default(),
        };

        let eras = file.eras.map_or_else(EraTable::saga_default, EraTable::new);

        let digest_interval = file
            .digest_interval_ms
            .map_or(DEFAULT_DIGEST_INTERVAL, Duration::from_millis);

        Ok(Self {
            webhook: WebhookTarget::parse(&raw_webhook),
            window,
            overrides,
            eras,
            digest_interval,
        })
    }

    /// Calculator using the configured override table.
    #[must_use]
    pub fn calculator(&self) -> CollectionScheduleCalculator {
        CollectionScheduleCalculator::new(self.overrides.clone())
    }

    /// Log and report whether the webhook is ready to use.
    #[must_use]
    pub fn check_configuration(&self) -> bool {
        tracing::info!(
            webhook = %self.webhook,
            overrides = self.overrides.len(),
            eras = self.eras.eras().len(),
            morning_hour = self.window.morning_hour(),
            evening_hour = self.window.evening_hour(),
            "checking configuration"
        );

        match &self.webhook {
            WebhookTarget::Endpoint(_) => {
                tracing::info!("configuration ok");
                true
            }
            WebhookTarget::Unconfigured => {
                tracing::warn!(
                    key = %ConfigKey::DiscordWebhookUrl,
                    "webhook URL is not configured"
                );
                false
            }
            WebhookTarget::Invalid(_) => {
                tracing::warn!(
                    key = %ConfigKey::DiscordWebhookUrl,
                    prefix = DISCORD_WEBHOOK_PREFIX,
                    "webhook URL is not a Discord webhook"
                );
                false
            }
        }
    }
}

fn validated_overrides(entries: Vec<MonthOverride>) -> Result<OverrideTable, ConfigError> {
    for entry in &entries {
        let date = NaiveDate::from_ymd_opt(entry.year, entry.month, entry.day).ok_or(
            ConfigError::InvalidOverride {
                year: entry.year,
                month: entry.month,
                day: entry.day,
            },
        )?;
        if date.weekday() != Weekday::Fri {
            tracing::warn!(%date, "override day is not a Friday, no collection will match it");
        }
    }
    Ok(OverrideTable::new(entries))
}
