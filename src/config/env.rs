//! Environment overrides for the application configuration.
//!
//! Values are read from the process environment, which the binary fills from
//! `.env` with dotenvy before loading the configuration.

use super::app::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Path of the configuration file: `BILLED_CONFIG` or `billed.toml`.
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var("BILLED_CONFIG").map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Applies `BILLED_LOCALE`, `BILLED_SORT_ORDER` and `BILLED_FIXTURES` on top of `config`.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Same as [`apply_env_overrides`] with an arbitrary variable lookup.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(locale) = lookup("BILLED_LOCALE") {
        config.bills.locale = locale.parse().map_err(|e| Error::Config {
            message: format!("BILLED_LOCALE: {e}"),
        })?;
    }

    if let Some(order) = lookup("BILLED_SORT_ORDER") {
        config.bills.sort_order = order.parse().map_err(|e| Error::Config {
            message: format!("BILLED_SORT_ORDER: {e}"),
        })?;
    }

    if let Some(fixtures) = lookup("BILLED_FIXTURES") {
        config.fixtures = Some(PathBuf::from(fixtures));
    }

    Ok(())
}
