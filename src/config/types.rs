//! Config error type and the global configuration handle.

use std::sync::{Arc, OnceLock};

use thiserror::Error;

use super::GantryConfig;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// gantry.toml exists but is not valid TOML for our schema.
    #[error("invalid gantry.toml: {0}")]
    Parse(String),
}

/// Global configuration handle, set once at startup.
static CONFIG: OnceLock<Arc<GantryConfig>> = OnceLock::new();

/// Install the configuration globally and return the shared handle.
pub fn init_config(config: GantryConfig) -> Arc<GantryConfig> {
    let arc = Arc::new(config);
    let _ = CONFIG.set(Arc::clone(&arc));
    arc
}

/// Get the global configuration.
///
/// Panics if called before `init_config` - configuration is installed in
/// `main` before any pipeline code runs.
pub fn cfg() -> Arc<GantryConfig> {
    Arc::clone(CONFIG.get().expect("config not initialized"))
}
