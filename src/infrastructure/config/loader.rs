use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project directory holding the configuration files
pub const CONFIG_DIR: &str = ".quest-engagement";

/// Prefix of environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "QUEST_ENGAGEMENT_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid bucket_size_secs: {0}. Must be a positive number")]
    InvalidBucketSize(f64),

    #[error("Invalid {name}: {value}. Must be zero or positive")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Invalid most_replayed_limit: 0. Must be at least 1")]
    InvalidMostReplayedLimit,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration relative to the working directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. `.quest-engagement/config.yaml`
    /// 3. `.quest-engagement/local.yaml` (optional local overrides)
    /// 4. `QUEST_ENGAGEMENT_*` environment variables
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`ConfigLoader::load`], with the config directory under `root`.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a single YAML file, without env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let recorder = &config.recorder;

        if !(recorder.bucket_size_secs.is_finite() && recorder.bucket_size_secs > 0.0) {
            return Err(ConfigError::InvalidBucketSize(recorder.bucket_size_secs));
        }

        for (name, value) in [
            ("start_threshold_secs", recorder.start_threshold_secs),
            ("bounce_threshold_secs", recorder.bounce_threshold_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if recorder.most_replayed_limit == 0 {
            return Err(ConfigError::InvalidMostReplayedLimit);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
