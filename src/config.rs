use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::responder::{KeywordRule, default_rules};

/// Bundled defaults, also used to seed the user config file.
const BLUEPRINT: &str = include_str!("../kiwiart.toml");

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub home_section: String,
    pub near_top_threshold: f64,
    pub reply_delay_ms: u64,
    pub greeting: String,
    pub catalog_path: Option<String>,
    pub log_file: Option<String>,
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub rules: Vec<KeywordRule>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let user_config_path = get_user_config_path();

        // If the user config doesn't exist, create it from the blueprint
        if let Some(path) = &user_config_path {
            if !path.exists() {
                if let Err(err) = write_blueprint(path) {
                    warn!(path = %path.display(), "could not create user config: {err}");
                }
            }
        }

        let mut builder = Config::builder()
            // 1. Bundled defaults
            .add_source(File::from_str(BLUEPRINT, FileFormat::Toml));
        // 2. User's global config
        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).required(false));
        }
        // 3. Local kiwiart.toml from CWD
        builder
            .add_source(File::with_name("kiwiart.toml").required(false))
            .build()?
            .try_deserialize()
    }

    /// Settings from the blueprint with `overrides` (TOML) merged on top.
    #[cfg(test)]
    pub fn from_toml(overrides: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(BLUEPRINT, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Configured rule table, or the built-in one when none is configured.
    pub fn keyword_rules(&self) -> Vec<KeywordRule> {
        if self.rules.is_empty() {
            default_rules()
        } else {
            self.rules.clone()
        }
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path.as_deref().map(expand_path)
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        match self.log_file.as_deref() {
            Some(path) => Some(expand_path(path)),
            None => dirs::cache_dir().map(|dir| dir.join("kiwiart").join("kiwiart.log")),
        }
    }

    pub fn to_toml(&self) -> Result<String, anyhow::Error> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

pub fn get_user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("kiwiart");
    path.push("kiwiart.toml");
    Some(path)
}

fn write_blueprint(path: &PathBuf) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, BLUEPRINT)
}
