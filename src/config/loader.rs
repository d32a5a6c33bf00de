use std::{fs, fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use config::{Config, Environment};
use log::{debug, info};

use super::RelayConfig;

/// Prefix for environment overrides, e.g. `RELAY_BASE_URL`.
pub const ENV_PREFIX: &str = "RELAY";

pub fn get_default_config() -> &'static str {
    include_str!("../../config/config.toml")
}

/// Loads the configuration at `path`, writing the defaults there first if the
/// file does not exist. `RELAY_*` environment variables override file values.
pub fn load_configuration(path: &Path) -> Result<RelayConfig> {
    load_configuration_with_env(path, None)
}

/// Like [`load_configuration`], but reads overrides from `env` instead of the
/// process environment when given.
pub fn load_configuration_with_env(path: &Path, env: Option<config::Map<String, String>>) -> Result<RelayConfig> {
    if !path.exists() {
        write_config_to(path, get_default_config()).context("Could not create default config")?;
        info!(path:% = path.display(); "Created new configuration file");
    }

    let filename = path.to_str().context("Invalid config file path")?;

    let cfg = Config::builder()
        .add_source(config::File::with_name(filename))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("Could not build config")?;

    let relay_config: RelayConfig = cfg.try_deserialize().context("Invalid relay configuration")?;
    debug!(path:% = path.display(), config:? = relay_config; "Configuration loaded");
    Ok(relay_config)
}

pub fn write_config_to(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create parent directories")?;
    };

    let mut file = File::create(path).context("Failed to create config file")?;
    file.write_all(source.as_bytes())
        .context("Failed to write config content")?;
    if !source.ends_with('\n') {
        file.write_all(b"\n").context("Failed to write newline")?;
    }
    Ok(())
}
