// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// JSON file mapping schedule names to frequencies.
    pub schedules_file: PathBuf,
    /// How many upcoming executions `preview` lists per schedule.
    pub preview_count: usize,
    /// Upper bound on a single wait in `watch`, so edits to the host clock
    /// are noticed.
    pub max_sleep_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedules_file: PathBuf::from("config/schedules.json"),
            preview_count: 5,
            max_sleep_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.scheduler.schedules_file.as_os_str().is_empty() {
            return Err("Scheduler schedules_file cannot be empty".to_string());
        }
        if self.scheduler.preview_count == 0 {
            return Err("Scheduler preview_count must be greater than 0".to_string());
        }
        if self.scheduler.max_sleep_seconds == 0 {
            return Err("Scheduler max_sleep_seconds must be greater than 0".to_string());
        }
        if self.observability.log_level.trim().is_empty() {
            return Err("Observability log_level cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_zero_preview_count() {
        let mut settings = Settings::default();
        settings.scheduler.preview_count = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_schedules_file() {
        let mut settings = Settings::default();
        settings.scheduler.schedules_file = PathBuf::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_sleep() {
        let mut settings = Settings::default();
        settings.scheduler.max_sleep_seconds = 0;
        assert!(settings.validate().is_err());
    }
}
