use std::env;
use thiserror::Error;

use super::routing::locale::{LocaleContext, LocaleError};

pub const LOCALE_VAR: &str = "DIRECTIONS_LOCALE";
pub const UTC_OFFSET_VAR: &str = "DIRECTIONS_UTC_OFFSET";

const DEFAULT_LOCALE: &str = "en_US";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DIRECTIONS_UTC_OFFSET must be a whole number of minutes, got '{0}'")]
    InvalidOffset(String),
    #[error(transparent)]
    Locale(#[from] LocaleError),
}

/// How failures are rendered for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainConfig {
    pub locale: String,
    pub utc_offset_minutes: i32,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl ExplainConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::var(LOCALE_VAR).ok(), env::var(UTC_OFFSET_VAR).ok())
    }

    fn from_vars(locale: Option<String>, offset: Option<String>) -> Result<Self, ConfigError> {
        let utc_offset_minutes = match offset {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOffset(raw))?,
            None => 0,
        };
        let config = Self {
            locale: locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            utc_offset_minutes,
        };
        // Fail early on a locale or offset the formatter cannot use.
        config.context()?;
        Ok(config)
    }

    pub fn context(&self) -> Result<LocaleContext, LocaleError> {
        LocaleContext::new(&self.locale, self.utc_offset_minutes)
    }
}
