//! Configuration Loader
//!
//! Layers defaults, an optional TOML file and environment overrides through
//! the `config` crate, then validates the result.

use super::error::{ConfigResult, ConfigurationError};
use super::HookChainConfig;
use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_PATH};
use config::{Config, Environment, File};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Builder-style loader for [`HookChainConfig`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    /// An explicitly chosen file must exist; the default location may be absent
    required: bool,
    env_prefix: String,
    /// Replaces the process environment, mainly so tests stay hermetic
    env_overrides: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
            required: false,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
            env_overrides: None,
        }
    }

    /// Load from `path` instead of the default location; the file must exist
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self.required = true;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Read overrides from `vars` rather than the process environment
    pub fn with_env_overrides(mut self, vars: HashMap<String, String>) -> Self {
        self.env_overrides = Some(vars);
        self
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> ConfigResult<HookChainConfig> {
        if self.required && !self.path.is_file() {
            return Err(ConfigurationError::ConfigFileNotFound {
                path: self.path.clone(),
            });
        }

        debug!(
            path = %self.path.display(),
            env_prefix = %self.env_prefix,
            "Loading hook chain configuration"
        );

        let environment = Environment::with_prefix(&self.env_prefix)
            .separator("__")
            .try_parsing(true)
            .source(self.env_overrides.clone().map(|vars| vars.into_iter().collect()));

        let merged = Config::builder()
            .add_source(File::from(self.path.as_path()).required(self.required))
            .add_source(environment)
            .build()
            .map_err(|e| ConfigurationError::load_error(self.path.display().to_string(), e))?;

        let config: HookChainConfig = merged
            .try_deserialize()
            .map_err(ConfigurationError::deserialization_error)?;

        config.validate()?;

        debug!(
            default_priority = config.default_priority,
            unregister_failed_handlers = config.unregister_failed_handlers,
            slow_handler_threshold_ms = config.slow_handler_threshold_ms,
            "Hook chain configuration loaded"
        );
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Priority;
    use std::io::Write;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_missing_default_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ConfigLoader::new().with_env_overrides(no_env());
        loader.path = dir.path().join("absent.toml");

        let config = loader.load().unwrap();
        assert_eq!(config, HookChainConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::new()
            .with_path(dir.path().join("absent.toml"))
            .with_env_overrides(no_env())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn test_file_values_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hook_chain.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "default_priority = 10").unwrap();
        writeln!(file, "unregister_failed_handlers = true").unwrap();

        let config = ConfigLoader::new()
            .with_path(&path)
            .with_env_overrides(no_env())
            .load()
            .unwrap();
        assert_eq!(config.default_priority, 10);
        assert!(config.unregister_failed_handlers);
        assert_eq!(
            config.slow_handler_threshold_ms,
            HookChainConfig::default().slow_handler_threshold_ms
        );
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hook_chain.toml");
        std::fs::write(&path, "default_priority = 10\n").unwrap();

        let vars = HashMap::from([
            ("TASKER_HOOKS__DEFAULT_PRIORITY".to_string(), "0".to_string()),
            (
                "TASKER_HOOKS__SLOW_HANDLER_THRESHOLD_MS".to_string(),
                "5".to_string(),
            ),
        ]);

        let config = ConfigLoader::new()
            .with_path(&path)
            .with_env_overrides(vars)
            .load()
            .unwrap();
        assert_eq!(config.default_priority, Priority::HIGHEST);
        assert_eq!(config.slow_handler_threshold_ms, 5);
    }

    #[test]
    fn test_custom_env_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hook_chain.toml");
        std::fs::write(&path, "default_priority = 10\n").unwrap();

        let vars = HashMap::from([
            (
                "STORE_HOOKS__UNREGISTER_FAILED_HANDLERS".to_string(),
                "true".to_string(),
            ),
            // Ignored: belongs to the default prefix
            ("TASKER_HOOKS__DEFAULT_PRIORITY".to_string(), "0".to_string()),
        ]);

        let config = ConfigLoader::new()
            .with_path(&path)
            .with_env_prefix("STORE_HOOKS")
            .with_env_overrides(vars)
            .load()
            .unwrap();
        assert!(config.unregister_failed_handlers);
        assert_eq!(config.default_priority, 10);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hook_chain.toml");
        std::fs::write(&path, "slow_handler_threshold_ms = 0\n").unwrap();

        let err = ConfigLoader::new()
            .with_path(&path)
            .with_env_overrides(no_env())
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }
}
