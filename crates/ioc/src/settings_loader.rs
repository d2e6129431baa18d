//! Settings Loader
//!
//! Loads [`ContainerSettings`] from:
//! - Configuration files (TOML, JSON, YAML, chosen by extension)
//! - Environment variables (`IOC_*` by default)
//!
//! Priority: environment variables override the file, the file overrides
//! preset defaults.

use anyhow::{anyhow, Context, Result};
use std::{env, fs, path::Path};
use tracing::debug;

use crate::settings::ContainerSettings;

/// Settings loader with file and environment sources
pub struct SettingsLoader {
    env_prefix: String,
    validate_on_load: bool,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            env_prefix: "IOC".to_string(),
            validate_on_load: true,
        }
    }

    /// Set environment variable prefix (default: "IOC")
    pub fn env_prefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enable/disable validation on load
    pub fn validate(&mut self, enabled: bool) -> &mut Self {
        self.validate_on_load = enabled;
        self
    }

    /// Load settings from a file and apply environment overrides
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ContainerSettings> {
        let mut settings = self.load_from_file(path)?;
        self.apply_environment_variables(&mut settings)?;
        self.finish(settings)
    }

    /// Defaults plus environment overrides, no file
    pub fn load_from_env(&self) -> Result<ContainerSettings> {
        let mut settings = ContainerSettings::default();
        self.apply_environment_variables(&mut settings)?;
        self.finish(settings)
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<ContainerSettings> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => self.load_from_toml(&content),
            Some("json") => self.load_from_json(&content),
            Some("yaml") | Some("yml") => self.load_from_yaml(&content),
            _ => Err(anyhow!(
                "Unsupported settings file format: {:?}",
                path.extension()
            )),
        }
    }

    pub fn load_from_toml(&self, content: &str) -> Result<ContainerSettings> {
        let settings: ContainerSettings = toml::from_str(content)?;
        Ok(settings)
    }

    pub fn load_from_json(&self, content: &str) -> Result<ContainerSettings> {
        let settings: ContainerSettings = serde_json::from_str(content)?;
        Ok(settings)
    }

    pub fn load_from_yaml(&self, content: &str) -> Result<ContainerSettings> {
        let settings: ContainerSettings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Save settings to file
    pub fn save_to_file<P: AsRef<Path>>(&self, settings: &ContainerSettings, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => toml::to_string_pretty(settings)?,
            Some("json") => serde_json::to_string_pretty(settings)?,
            Some("yaml") | Some("yml") => serde_yaml::to_string(settings)?,
            _ => {
                return Err(anyhow!(
                    "Unsupported settings file format: {:?}",
                    path.extension()
                ))
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Apply `<PREFIX>_*` environment variables
    pub fn apply_environment_variables(&self, settings: &mut ContainerSettings) -> Result<()> {
        let prefix = format!("{}_", self.env_prefix);

        for (key, value) in env::vars() {
            if let Some(setting) = key.strip_prefix(&prefix) {
                self.apply_env_var(settings, setting, &value)
                    .with_context(|| format!("Invalid value for {key}"))?;
            }
        }

        Ok(())
    }

    fn apply_env_var(&self, settings: &mut ContainerSettings, key: &str, value: &str) -> Result<()> {
        match key.to_uppercase().as_str() {
            "EAGER_INIT" => settings.eager_init = parse_bool(value)?,
            "VALIDATE_ON_START" => settings.validate_on_start = parse_bool(value)?,
            "BENCHMARK_ENABLED" => settings.benchmark_enabled = parse_bool(value)?,
            "MAX_RESOLUTION_DEPTH" => settings.max_resolution_depth = value.trim().parse()?,
            "DEBUG_LOGGING" => settings.debug_logging = parse_bool(value)?,
            other => debug!("Ignoring unknown settings variable {}", other),
        }

        Ok(())
    }

    fn finish(&self, settings: ContainerSettings) -> Result<ContainerSettings> {
        if self.validate_on_load {
            settings.validate()?;
        }
        Ok(settings)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{other}'")),
    }
}
