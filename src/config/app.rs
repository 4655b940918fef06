//! Application settings loaded from `billed.toml`.
//!
//! Every section is optional; missing values fall back to the defaults the
//! application ships with.

use crate::{
    core::{bills::SortOrder, format::DateLocale},
    entities::DEFAULT_PCT,
    errors::{Error, Result},
    session::USER_KEY,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "billed.toml";

/// Structure of the entire configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bills listing settings
    pub bills: BillsConfig,
    /// New-bill form settings
    pub new_bill: NewBillConfig,
    /// Session lookup settings
    pub session: SessionConfig,
    /// JSON file seeding the bundled in-memory store
    pub fixtures: Option<PathBuf>,
}

/// Settings of the bills listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BillsConfig {
    /// Language of humanized dates and statuses
    pub locale: DateLocale,
    /// Order in which bills are presented
    pub sort_order: SortOrder,
}

/// Settings of the new-bill form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewBillConfig {
    /// MIME types accepted for receipts
    pub allowed_file_types: Vec<String>,
    /// Percentage used when the form's pct is blank or not numeric
    pub default_pct: i64,
    /// Delete uploads left behind by a replaced selection or a failed submit
    pub compensate_orphaned_uploads: bool,
}

impl Default for NewBillConfig {
    fn default() -> Self {
        Self {
            allowed_file_types: ["image/jpeg", "image/jpg", "image/png"]
                .map(String::from)
                .to_vec(),
            default_pct: DEFAULT_PCT,
            compensate_orphaned_uploads: true,
        }
    }
}

impl NewBillConfig {
    /// Whether `mime_type` is on the allow-list (case-insensitive).
    #[must_use]
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.allowed_file_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type.trim()))
    }
}

/// Settings of the session lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage key of the connected user record
    pub storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: USER_KEY.to_string(),
        }
    }
}

/// Loads the configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type (e.g. an unknown locale)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from config file {path_ref:?}: {e}"),
    })
}

/// Loads the configuration from the default location (./billed.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config(DEFAULT_CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            fixtures = "fixtures/bills.json"

            [bills]
            locale = "fr"
            sort_order = "ascending"

            [new_bill]
            allowed_file_types = ["image/png"]
            default_pct = 10
            compensate_orphaned_uploads = false

            [session]
            storage_key = "employee"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bills.locale, DateLocale::Fr);
        assert_eq!(config.bills.sort_order, SortOrder::Ascending);
        assert_eq!(config.new_bill.allowed_file_types, ["image/png"]);
        assert_eq!(config.new_bill.default_pct, 10);
        assert!(!config.new_bill.compensate_orphaned_uploads);
        assert_eq!(config.session.storage_key, "employee");
        assert_eq!(config.fixtures, Some(PathBuf::from("fixtures/bills.json")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bills.locale, DateLocale::En);
        assert_eq!(config.bills.sort_order, SortOrder::Descending);
        assert_eq!(config.new_bill.default_pct, 20);
        assert!(config.new_bill.compensate_orphaned_uploads);
        assert_eq!(config.session.storage_key, "user");
        assert!(config.fixtures.is_none());
    }

    #[test]
    fn test_allow_list() {
        let config = NewBillConfig::default();
        assert!(config.accepts("image/png"));
        assert!(config.accepts("image/jpg"));
        assert!(config.accepts("IMAGE/JPEG"));
        assert!(!config.accepts("text/plain"));
        assert!(!config.accepts("application/pdf"));
        assert!(!config.accepts(""));
    }

    #[test]
    fn test_invalid_locale_is_a_config_error() {
        let result: std::result::Result<AppConfig, _> = toml::from_str(
            r#"
            [bills]
            locale = "de"
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = load_config("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
