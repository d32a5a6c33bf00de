//! Logging bootstrap and secret masking.
//!
//! Logging is configured through log4rs. An external `log4rs.yml` in the
//! working directory wins; otherwise the embedded defaults are used. Both go
//! through the `structured_console` encoder so key/value pairs attached with
//! `info!(bundle_id = id; "...")` show up after the message.

pub mod structured_console_encoder;

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, anyhow};
use log::{debug, info};
use log4rs::{
    Config,
    config::{Deserializers, RawConfig},
};

use crate::log::structured_console_encoder::StructuredConsoleEncoderDeserializer;

/// Name of the optional external logging configuration.
pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

const EMBEDDED_LOG_CONFIG: &str = include_str!("../../resources/default_log4rs.yml");

fn deserializers() -> Deserializers {
    let mut deserializers = Deserializers::default();
    deserializers.insert("structured_console", StructuredConsoleEncoderDeserializer);
    deserializers
}

/// Initializes the global logger. Must be called at most once per process.
pub fn init_logging() -> anyhow::Result<()> {
    let path = Path::new(LOG_CONFIG_FILE);

    if path.exists() {
        log4rs::init_file(path, deserializers())
            .with_context(|| format!("failed to load external {}", LOG_CONFIG_FILE))?;
        info!(path = LOG_CONFIG_FILE; "Logging initialized from external configuration");
        return Ok(());
    }

    let config = embedded_config()?;
    log4rs::init_config(config).context("failed to initialize logging from embedded config")?;

    debug!("Logging initialized from embedded defaults (no external log4rs.yml found)");
    Ok(())
}

fn embedded_config() -> anyhow::Result<Config> {
    let raw_config: RawConfig =
        serde_yaml::from_str(EMBEDDED_LOG_CONFIG).context("embedded logging configuration is invalid YAML")?;

    let (appenders, errors) = raw_config.appenders_lossy(&deserializers());
    if !errors.is_empty() {
        return Err(anyhow!("errors parsing embedded appenders: {:?}", errors));
    }

    Config::builder()
        .appenders(appenders)
        .loggers(raw_config.loggers())
        .build(raw_config.root())
        .context("failed to build logging config")
}

fn reveal_secrets() -> bool {
    static REVEAL_SECRETS_CACHE: OnceLock<bool> = OnceLock::new();

    *REVEAL_SECRETS_CACHE.get_or_init(|| {
        std::env::var("REVEAL_SECRETS")
            .map(|v| {
                let val = v.to_lowercase();
                val == "true" || val == "1"
            })
            .unwrap_or(false)
    })
}

/// Masks a secret (such as the relay uuid) showing only its first and last
/// six characters. Short values are hidden entirely.
/// If REVEAL_SECRETS is true, returns the original string.
pub fn mask_string(s: &str) -> String {
    if reveal_secrets() {
        return s.to_string();
    }

    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}
