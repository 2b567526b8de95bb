mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable that overrides `catalog.api_key`.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    finalize(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./cinefeed.toml",
        "./config.toml",
        "~/.config/cinefeed/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    let mut config = Config::default();
    finalize(&mut config);
    Ok(config)
}

/// Parse and validate a TOML document
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Apply environment overrides, then warn about settings still missing.
fn finalize(config: &mut Config) {
    override_api_key(config, std::env::var(API_KEY_ENV).ok());
    if api_key_missing(config) {
        tracing::warn!("catalog.api_key is empty; set it or export {}", API_KEY_ENV);
    }
}

fn override_api_key(config: &mut Config, key: Option<String>) {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        config.catalog.api_key = key;
    }
}

fn api_key_missing(config: &Config) -> bool {
    config.catalog.api_key.trim().is_empty()
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let catalog = &config.catalog;
    if catalog.base_url.trim().is_empty() {
        anyhow::bail!("catalog.base_url cannot be empty");
    }
    if catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs cannot be 0");
    }
    if catalog.requests_per_second == 0 {
        anyhow::bail!("catalog.requests_per_second cannot be 0");
    }

    let hero = &config.hero;
    if hero.default_delay_ms == 0 {
        anyhow::bail!("hero.default_delay_ms cannot be 0");
    }
    if hero.sources.is_empty() {
        anyhow::bail!("hero.sources must list at least one media kind");
    }
    if let AutoplayPolicy::Lengthen { delay_ms: 0 } = hero.unmuted_policy {
        anyhow::bail!("hero.unmuted_policy.delay_ms cannot be 0");
    }
    if hero.max_items == Some(0) {
        tracing::warn!("hero.max_items is 0; the carousel will always be empty");
    }

    Ok(())
}
