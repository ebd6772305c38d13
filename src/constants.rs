//! # Hook Chain Constants
//!
//! Well-known priorities for handler registration. Lower values run first;
//! handlers sharing a priority run in registration order.

/// Priority bands for handler bindings
pub struct Priority;

impl Priority {
    /// Runs before everything else
    pub const HIGHEST: i64 = 0;
    /// Handlers shipped with the host itself
    pub const SYSTEM: i64 = (i32::MAX / 4) as i64;
    /// Default band for user-provided handlers
    pub const USER: i64 = (i32::MAX / 2) as i64;
    /// Runs after everything else
    pub const LOWEST: i64 = i32::MAX as i64;
}

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "TASKER_HOOKS";

/// Default location of the hook chain configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/hook_chain.toml";

/// Default threshold above which a single handler call is logged as slow
pub const DEFAULT_SLOW_HANDLER_THRESHOLD_MS: u64 = 250;
