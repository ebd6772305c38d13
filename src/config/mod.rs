//! # Hook Chain Configuration
//!
//! Settings shared by the registry and the orchestrator of a hook chain.
//!
//! ## Sources
//!
//! Values are layered, later sources winning:
//!
//! 1. Built-in defaults ([`HookChainConfig::default`])
//! 2. A TOML file (`config/hook_chain.toml` unless another path is given)
//! 3. `TASKER_HOOKS__*` environment variables, e.g.
//!    `TASKER_HOOKS__UNREGISTER_FAILED_HANDLERS=true`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tasker_hooks::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! println!("default priority: {}", config.default_priority);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{Priority, DEFAULT_SLOW_HANDLER_THRESHOLD_MS};
use serde::{Deserialize, Serialize};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration for one hook chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HookChainConfig {
    /// Priority used by `register_with_default_priority`
    pub default_priority: i64,

    /// Also remove a handler from the chain once it has failed an invocation
    pub unregister_failed_handlers: bool,

    /// Handler calls slower than this are logged at warn level
    pub slow_handler_threshold_ms: u64,
}

impl Default for HookChainConfig {
    fn default() -> Self {
        Self {
            default_priority: Priority::USER,
            unregister_failed_handlers: false,
            slow_handler_threshold_ms: DEFAULT_SLOW_HANDLER_THRESHOLD_MS,
        }
    }
}

impl HookChainConfig {
    /// Check the configuration for values the chain cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if !(Priority::HIGHEST..=Priority::LOWEST).contains(&self.default_priority) {
            return Err(ConfigurationError::invalid_value(
                "default_priority",
                self.default_priority.to_string(),
                format!(
                    "must be between {} and {}",
                    Priority::HIGHEST,
                    Priority::LOWEST
                ),
            ));
        }

        if self.slow_handler_threshold_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "slow_handler_threshold_ms",
                "0",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}
