use std::path::{Path, PathBuf};

use config::ConfigError;
use serde::Deserialize;

use crate::{core::state::LIMIT, utils};

const CONFIG: &str = include_str!("../../.config/config.json5");

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Directory holding the shot logs
    #[serde(default)]
    pub history_dir: PathBuf,
}

fn default_page_size() -> u64 {
    LIMIT
}

impl Config {
    /// Load the configuration from the user config directory
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(&utils::get_config_dir())
    }

    /// Load the configuration from `config_dir`, layered over the embedded
    /// defaults. A directory without any config file is not an error.
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let default_config: Config = json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))?;
        let data_dir = utils::get_data_dir();
        let default_page_size = i64::try_from(default_config.page_size)
            .map_err(|e| ConfigError::Message(format!("Invalid default page size: {e}")))?;
        let mut builder = config::Config::builder()
            .set_default("page_size", default_page_size)?
            .set_default("history_dir", data_dir.join("h").to_string_lossy().to_string())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(*format)
                    .required(false),
            );
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            log::info!(
                "No configuration file found in {}, using defaults",
                config_dir.display()
            );
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;

        if cfg.page_size == 0 {
            log::warn!(
                "page_size must be positive, falling back to {}",
                default_config.page_size
            );
            cfg.page_size = default_config.page_size.max(1);
        }

        Ok(cfg)
    }
}
