use serde::{Deserialize, Serialize};

/// Main configuration structure for the engagement engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Session recording configuration
    #[serde(default)]
    pub recorder: RecorderConfig,

    /// Eligibility evaluation configuration
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recorder and reconciliation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecorderConfig {
    /// Width of the view-timeline buckets, in seconds
    #[serde(default = "default_bucket_size_secs")]
    pub bucket_size_secs: f64,

    /// A play event before this media time marks the session as started
    #[serde(default = "default_start_threshold_secs")]
    pub start_threshold_secs: f64,

    /// Sessions watching less than this count as a bounce
    #[serde(default = "default_bounce_threshold_secs")]
    pub bounce_threshold_secs: f64,

    /// Number of most replayed ranges kept in the aggregate
    #[serde(default = "default_most_replayed_limit")]
    pub most_replayed_limit: usize,
}

const fn default_bucket_size_secs() -> f64 {
    1.0
}

const fn default_start_threshold_secs() -> f64 {
    0.5
}

const fn default_bounce_threshold_secs() -> f64 {
    3.0
}

const fn default_most_replayed_limit() -> usize {
    10
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            bucket_size_secs: default_bucket_size_secs(),
            start_threshold_secs: default_start_threshold_secs(),
            bounce_threshold_secs: default_bounce_threshold_secs(),
            most_replayed_limit: default_most_replayed_limit(),
        }
    }
}

/// What to do when a collaborator error reaches milestone evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Surface the error to the caller
    #[default]
    Strict,
    /// Log the error and report "not eligible"
    Lenient,
}

/// Eligibility evaluation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EvaluationConfig {
    #[serde(default)]
    pub mode: EvaluationMode,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
