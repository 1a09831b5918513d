/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of setup-balance.
 *
 * setup-balance is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * setup-balance is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with setup-balance. If not, see <https://www.gnu.org/licenses/>.
 */


use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Source};
use serde::{Deserialize, Serialize};
use tracing::{warn, Level};
use chassis::model::{ModelConfig, DEFAULT_REFERENCE_LATERAL_G, DEFAULT_UNCHANGED_DEAD_BAND};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    reference_lateral_g: f64,
    unchanged_dead_band: f64,
    log_level: String,
    #[serde(default)]
    reference_data_path: Option<String>
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            reference_lateral_g: DEFAULT_REFERENCE_LATERAL_G,
            unchanged_dead_band: DEFAULT_UNCHANGED_DEAD_BAND,
            log_level: Settings::DEFAULT_LOG_LEVEL.to_string(),
            reference_data_path: None
        }
    }
}

impl Settings {
    const REFERENCE_LATERAL_G: &'static str = "reference_lateral_g";
    const UNCHANGED_DEAD_BAND: &'static str = "unchanged_dead_band";
    const LOG_LEVEL: &'static str = "log_level";
    const DEFAULT_LOG_LEVEL: &'static str = "info";
    const CONFIG_FILENAME: &'static str = "setup-balance-conf.toml";
    const ENV_PREFIX: &'static str = "SETUP_BALANCE";

    pub fn path() -> PathBuf {
        crate::data::get_local_app_data_path().join(Settings::CONFIG_FILENAME)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default(Settings::REFERENCE_LATERAL_G, DEFAULT_REFERENCE_LATERAL_G)?
            .set_default(Settings::UNCHANGED_DEAD_BAND, DEFAULT_UNCHANGED_DEAD_BAND)?
            .set_default(Settings::LOG_LEVEL, Settings::DEFAULT_LOG_LEVEL)
    }

    /// Defaults, then the settings file, then `SETUP_BALANCE_*` environment variables.
    /// Runs before logging is up, so failures are returned rather than logged.
    pub fn load() -> Result<Self, ConfigError> {
        Settings::load_from(config::File::from(Settings::path()))
    }

    fn load_from<S: Source + Send + Sync + 'static>(file: S) -> Result<Self, ConfigError> {
        Settings::builder()?
            .add_source(file)
            .add_source(config::Environment::with_prefix(Settings::ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    pub fn reference_lateral_g(&self) -> f64 {
        self.reference_lateral_g
    }

    pub fn unchanged_dead_band(&self) -> f64 {
        self.unchanged_dead_band
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            reference_lateral_g: self.reference_lateral_g,
            unchanged_dead_band: self.unchanged_dead_band
        }
    }

    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or_else(|_| {
            eprintln!("Unknown log level `{}`; using {}", self.log_level, Settings::DEFAULT_LOG_LEVEL);
            Level::INFO
        })
    }

    pub fn reference_data_path(&self) -> Option<PathBuf> {
        let path = PathBuf::from(self.reference_data_path.as_ref()?);
        if path.is_file() {
            return Some(path);
        }
        warn!("Reference data file {} not found", path.display());
        None
    }

    pub fn write(&self) -> std::io::Result<()> {
        let path = Settings::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string(&self).map_err(|_e|{
            std::io::Error::new(std::io::ErrorKind::Other, "Failed to encode settings to toml")
        })?)
    }
}
