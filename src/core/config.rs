//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.
//! Invalid values never stop the server: they are logged and the default is used.

use thiserror::Error;

use crate::core::backdrop::{BackdropError, BackdropOptions, ForceMode};

/// Forces a backdrop tier: `auto`, `optimized`, `simple` or `none`
pub const BACKDROP_MODE_VAR: &str = "BACKDROP_MODE";

/// Enables the adaptive quality monitor
pub const BACKDROP_ADAPTIVE_VAR: &str = "BACKDROP_ADAPTIVE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("BACKDROP_MODE: {0}")]
    InvalidMode(#[from] BackdropError),

    #[error("{var}: expected a boolean, got '{value}'")]
    InvalidFlag { var: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tier override passed to every page
    /// Example: BACKDROP_MODE=simple
    pub backdrop_mode: ForceMode,

    /// Whether the client demotes the backdrop on low frame rates
    /// Example: BACKDROP_ADAPTIVE=false
    pub backdrop_adaptive: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::defaults();

        let backdrop_mode = match read(&lookup, BACKDROP_MODE_VAR).map(|raw| parse_mode(&raw)) {
            Some(Ok(mode)) => mode,
            Some(Err(err)) => {
                tracing::warn!("{err}; using {}", defaults.backdrop_mode);
                defaults.backdrop_mode
            }
            None => defaults.backdrop_mode,
        };

        let backdrop_adaptive =
            match read(&lookup, BACKDROP_ADAPTIVE_VAR).map(|raw| parse_flag(BACKDROP_ADAPTIVE_VAR, &raw)) {
                Some(Ok(flag)) => flag,
                Some(Err(err)) => {
                    tracing::warn!("{err}; using {}", defaults.backdrop_adaptive);
                    defaults.backdrop_adaptive
                }
                None => defaults.backdrop_adaptive,
            };

        Self {
            backdrop_mode,
            backdrop_adaptive,
        }
    }

    /// Built-in values used when a variable is missing or invalid
    pub fn defaults() -> Self {
        Self {
            backdrop_mode: ForceMode::Auto,
            backdrop_adaptive: true,
        }
    }

    /// Options embedded into every rendered page
    pub fn backdrop_options(&self) -> BackdropOptions {
        BackdropOptions {
            force_mode: self.backdrop_mode,
            enable_performance_mode: self.backdrop_adaptive,
            ..BackdropOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Blank values count as unset
fn read(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

pub fn parse_mode(value: &str) -> Result<ForceMode, ConfigError> {
    Ok(value.parse::<ForceMode>()?)
}

pub fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}
