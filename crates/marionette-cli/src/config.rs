use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Marionette CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the engine instance; the only external configuration
    /// surface the core client needs.
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub colors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { colors: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the config file if present,
    /// then environment overrides.
    pub fn load() -> CliResult<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)
            .map_err(|e| CliError::config(format!("failed to parse {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("marionette").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    // Lookup is injected so the override precedence can be tested
    // without touching the process environment.
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup("MARIONETTE_BASE_URL") {
            self.engine.base_url = base_url;
        }
        if let Some(timeout) = lookup("MARIONETTE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.engine.timeout_secs = secs;
            }
        }
        if let Some(level) = lookup("MARIONETTE_LOG") {
            self.logging.level = level;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.engine.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_the_local_engine() {
        let config = Config::default();
        assert_eq!(config.engine.base_url, "http://localhost:3000");
        assert_eq!(config.engine.timeout_secs, 30);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nbase_url = \"http://engine:9000\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.engine.base_url, "http://engine:9000");
        assert_eq!(config.engine.timeout_secs, 30);
        assert!(config.output.colors);
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[engine]\nbase_url = \"http://engine:9000\"\ntimeout_secs = 5"
        )
        .unwrap();

        let mut config = Config::load_from(file.path()).unwrap();
        config.apply_overrides_from(|key| match key {
            "MARIONETTE_BASE_URL" => Some("http://elsewhere:1234".to_string()),
            "MARIONETTE_TIMEOUT_SECS" => Some("9".to_string()),
            "MARIONETTE_LOG" => Some("debug".to_string()),
            _ => None,
        });

        assert_eq!(config.engine.base_url, "http://elsewhere:1234");
        assert_eq!(config.engine.timeout_secs, 9);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn unparseable_timeout_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(|key| match key {
            "MARIONETTE_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.engine.timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine = 12").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, CliError::ConfigError { .. }));
    }
}
