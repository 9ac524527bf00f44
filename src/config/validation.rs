use crate::config::types::{Config, FetcherConfig, PoolConfig, SiteConfig, StoreConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_pool_config(&config.pool)?;
    validate_render_config(config)?;
    validate_store_config(&config.store)?;
    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.page_param.trim().is_empty() {
        return Err(ConfigError::Validation(
            "page-param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.backoff_factor < 1 {
        return Err(ConfigError::Validation(format!(
            "backoff-factor must be >= 1, got {}",
            config.backoff_factor
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates pool sizing
fn validate_pool_config(config: &PoolConfig) -> Result<(), ConfigError> {
    if config.max_in_flight < 1 || config.max_in_flight > 256 {
        return Err(ConfigError::Validation(format!(
            "max-in-flight must be between 1 and 256, got {}",
            config.max_in_flight
        )));
    }

    Ok(())
}

/// Listing rendering needs a proxy endpoint and a credential
fn validate_render_config(config: &Config) -> Result<(), ConfigError> {
    match &config.render {
        Some(render) => {
            Url::parse(&render.endpoint)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid render endpoint: {}", e)))?;

            if config.site.render_listings && render.api_key.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "render-listings requires render.api-key".to_string(),
                ));
            }
        }
        None if config.site.render_listings => {
            return Err(ConfigError::Validation(
                "render-listings requires a [render] section".to_string(),
            ));
        }
        None => {}
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "store path cannot be empty".to_string(),
        ));
    }

    validate_identifier(&config.collection)
}

/// The collection name is spliced into SQL, so it must be a plain identifier
fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid {
        return Err(ConfigError::Validation(format!(
            "collection must be a plain identifier, got '{}'",
            name
        )));
    }

    Ok(())
}
