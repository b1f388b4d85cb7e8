use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::host::chromium::{ChromiumHostConfig, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::scroll::ScrollSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Browser
    pub feed_url: String,
    pub chrome_path: Option<PathBuf>,
    pub chrome_user_data_dir: Option<PathBuf>,
    pub headless: bool,
    pub page_timeout: Duration,

    // Scrolling
    pub settle_delay: Duration,
    pub final_settle: Duration,
    pub max_scroll_rounds: u32,
    pub stable_rounds: u32,

    // Output
    pub output_dir: PathBuf,
    pub assume_yes: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Browser
            feed_url: env_or_default("FEED_URL", "https://t.bilibili.com/"),
            chrome_path: optional_env("CHROME_PATH").map(PathBuf::from),
            chrome_user_data_dir: optional_env("CHROME_USER_DATA_DIR").map(PathBuf::from),
            headless: parse_env_bool("HEADLESS", true)?,
            page_timeout: Duration::from_secs(parse_env_u64("PAGE_TIMEOUT_SECS", 30)?),

            // Scrolling
            settle_delay: Duration::from_millis(parse_env_u64("SETTLE_DELAY_MS", 1500)?),
            final_settle: Duration::from_millis(parse_env_u64("FINAL_SETTLE_MS", 2000)?),
            max_scroll_rounds: parse_env_u32("MAX_SCROLL_ROUNDS", 60)?,
            stable_rounds: parse_env_u32("STABLE_ROUNDS", 3)?,

            // Output
            output_dir: PathBuf::from(env_or_default("OUTPUT_DIR", ".")),
            assume_yes: parse_env_bool("ASSUME_YES", false)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.feed_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    name: "FEED_URL".to_string(),
                    message: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    name: "FEED_URL".to_string(),
                    message: e.to_string(),
                });
            }
        }
        if self.max_scroll_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_SCROLL_ROUNDS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.stable_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "STABLE_ROUNDS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn scroll_settings(&self) -> ScrollSettings {
        ScrollSettings {
            settle_delay: self.settle_delay,
            final_settle: self.final_settle,
            max_rounds: self.max_scroll_rounds,
            stable_rounds: self.stable_rounds,
        }
    }

    #[must_use]
    pub fn host_config(&self) -> ChromiumHostConfig {
        ChromiumHostConfig {
            feed_url: self.feed_url.clone(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            page_timeout: self.page_timeout,
            chrome_path: self.chrome_path.clone(),
            user_data_dir: self.chrome_user_data_dir.clone(),
            headless: self.headless,
        }
    }

    /// Defaults without reading the environment.
    #[must_use]
    pub fn for_testing() -> Self {
        let scroll = ScrollSettings::default();
        Self {
            feed_url: "https://t.bilibili.com/".to_string(),
            chrome_path: None,
            chrome_user_data_dir: None,
            headless: true,
            page_timeout: Duration::from_secs(30),
            settle_delay: scroll.settle_delay,
            final_settle: scroll.final_settle,
            max_scroll_rounds: scroll.max_rounds,
            stable_rounds: scroll.stable_rounds,
            output_dir: PathBuf::from("."),
            assume_yes: false,
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => parse_bool(name, &val),
        _ => Ok(default),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseBool {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
