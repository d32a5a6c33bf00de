//! Relay client configuration.
//!
//! Values come from a TOML file (created with defaults on first use), then
//! `RELAY_*` environment variables, then command line flags via [`ApplyArgs`].

mod loader;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::{ApplyArgs, ConfirmArgs, RelayArgs};
use crate::confirmation::DEFAULT_CONFIRMATION_TIMEOUT;
use crate::http::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, HttpClient, LogDiagnostics};
use crate::log::mask_string;
use crate::relay::RelayClient;

pub use loader::{ENV_PREFIX, get_default_config, load_configuration, load_configuration_with_env, write_config_to};

pub const DEFAULT_BASE_URL: &str = "https://mainnet.block-engine.jito.wtf/api/v1";

#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    pub base_url: String,
    pub uuid: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub diagnostics: bool,
    pub confirmation_timeout_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            uuid: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            diagnostics: false,
            confirmation_timeout_ms: DEFAULT_CONFIRMATION_TIMEOUT.as_millis() as u64,
        }
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("base_url", &self.base_url)
            .field("uuid", &self.uuid.as_deref().map(mask_string))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("diagnostics", &self.diagnostics)
            .field("confirmation_timeout_ms", &self.confirmation_timeout_ms)
            .finish()
    }
}

impl RelayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    /// Builds a client with this configuration's transport settings.
    pub fn build_client(&self) -> anyhow::Result<RelayClient> {
        let base_url = Url::parse(&self.base_url).with_context(|| format!("Invalid base_url '{}'", self.base_url))?;

        let mut http_client = HttpClient::with_config(base_url, self.max_retries, self.request_timeout())?;
        if self.diagnostics {
            http_client = http_client.with_diagnostics(Arc::new(LogDiagnostics));
        }

        Ok(RelayClient::with_http_client(http_client, self.uuid.clone()))
    }
}

impl ApplyArgs for RelayConfig {
    fn apply_relay(&mut self, args: &RelayArgs) {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(uuid) = &args.uuid {
            self.uuid = Some(uuid.clone());
        }
        if args.diagnostics {
            self.diagnostics = true;
        }
    }

    fn apply_confirm(&mut self, args: &ConfirmArgs) {
        if let Some(timeout_ms) = args.timeout_ms {
            self.confirmation_timeout_ms = timeout_ms;
        }
    }
}
