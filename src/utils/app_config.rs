use config::{Config, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::sync::RwLock;

use super::error::Result;

// The process-wide configuration, merged from the embedded defaults, an
// optional user config file, and EDFSIM_* environment variables.
lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

/// Fallbacks for the simulation parameters not given on the command line.
#[derive(Debug, Deserialize)]
pub struct SimulationDefaults {
    pub break_time: i64,
    pub speed: i64,
    pub overrun_break: bool,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub simulation: SimulationDefaults,
}

impl AppConfig {
    /// Install the embedded defaults and the environment overrides. Call
    /// once, early in `main`.
    pub fn init(default_config: Option<&str>) -> Result<()> {
        let mut settings = Config::new();

        if let Some(contents) = default_config {
            settings.merge(config::File::from_str(contents, config::FileFormat::Toml))?;
        }
        settings.merge(Environment::with_prefix("EDFSIM"))?;

        *CONFIG.write()? = settings;
        Ok(())
    }

    /// Merge a user-supplied config file on top of the defaults.
    pub fn merge_config(config_file: Option<&str>) -> Result<()> {
        if let Some(path) = config_file {
            CONFIG.write()?.merge(config::File::with_name(path))?;
        }
        Ok(())
    }

    pub fn set(key: &str, value: &str) -> Result<()> {
        CONFIG.write()?.set(key, value)?;
        Ok(())
    }

    pub fn get<'de, T>(key: &'de str) -> Result<T>
    where
        T: serde::Deserialize<'de>,
    {
        Ok(CONFIG.read()?.get::<T>(key)?)
    }

    /// Snapshot of the typed configuration. Fetch again after any change.
    pub fn fetch() -> Result<AppConfig> {
        let config = CONFIG.read()?.clone();
        Ok(config.try_into()?)
    }
}
