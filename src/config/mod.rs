/// Settings structures and TOML loading
pub mod app;

/// Environment variable overrides
pub mod env;

pub use app::{AppConfig, BillsConfig, NewBillConfig, SessionConfig, load_config, load_default_config};

use crate::errors::Result;
use tracing::info;

/// Loads the configuration the binary runs with.
///
/// Reads the file named by `BILLED_CONFIG` (default `billed.toml`) when it
/// exists and falls back to the built-in defaults otherwise, then applies the
/// environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = env::config_path();
    let mut config = if path.exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {:?}", path);
        config
    } else {
        info!("No configuration file at {:?}, using defaults", path);
        AppConfig::default()
    };
    env::apply_env_overrides(&mut config)?;
    Ok(config)
}
