use crate::config::types::{Config, RenderConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Overrides `site.base-url`
pub const ENV_BASE_URL: &str = "COMIC_SYNC_BASE_URL";

/// Overrides `store.path`
pub const ENV_STORE_PATH: &str = "COMIC_SYNC_STORE_PATH";

/// Supplies `render.api-key` so the credential can stay out of the file
pub const ENV_RENDER_KEY: &str = "COMIC_SYNC_RENDER_KEY";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;
    let config = apply_env_overrides(config, |key| std::env::var(key).ok());

    validate(&config)?;

    Ok(config)
}

/// Applies environment overrides using the given lookup
///
/// Empty values are ignored. A render key without a `[render]` section is
/// dropped since there is no endpoint to send it to.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.site.base_url = base_url;
    }

    if let Some(path) = lookup(ENV_STORE_PATH) {
        config.store.path = path;
    }

    if let Some(key) = lookup(ENV_RENDER_KEY) {
        match config.render.as_mut() {
            Some(RenderConfig { api_key, .. }) => *api_key = key,
            None => tracing::warn!("{} is set but no [render] section is configured", ENV_RENDER_KEY),
        }
    }

    config
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
