use super::currency::{Amount, CurrencyCode};
use super::session::SessionDefaults;
use crate::providers::util::RetryPolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com/v4";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateApiConfig {
    pub base_url: String,
}

impl Default for ExchangeRateApiConfig {
    fn default() -> Self {
        ExchangeRateApiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchangerate_api: ExchangeRateApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultsConfig {
    /// Initial amount; `null` starts with an empty field.
    #[serde(default = "default_amount")]
    pub amount: Option<f64>,
    #[serde(default = "default_from")]
    pub from: CurrencyCode,
    #[serde(default = "default_to")]
    pub to: CurrencyCode,
}

fn default_amount() -> Option<f64> {
    Some(1.0)
}

fn default_from() -> CurrencyCode {
    "USD".into()
}

fn default_to() -> CurrencyCode {
    "INR".into()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            amount: default_amount(),
            from: default_from(),
            to: default_to(),
        }
    }
}

impl DefaultsConfig {
    pub fn to_session_defaults(&self) -> Result<SessionDefaults> {
        let amount = match self.amount {
            Some(v) => Amount::new(v).context("Invalid default amount")?,
            None => Amount::EMPTY,
        };
        Ok(SessionDefaults {
            amount,
            from: self.from.as_str().parse().context("Invalid default source currency")?,
            to: self.to.as_str().parse().context("Invalid default target currency")?,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults
    /// when no file has been set up there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        // An empty file deserializes to unit, not to a map
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
