//! High-level client for the bundle relay.
//!
//! [`RelayClient`] maps each relay operation onto an endpoint path and query
//! string, then hands the typed call to the JSON-RPC transport.
//!
//! # Example
//!
//! ```rust,no_run
//! use url::Url;
//! use bundle_relay::relay::RelayClient;
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = RelayClient::new(Url::parse("https://mainnet.block-engine.jito.wtf/api/v1")?, None)?;
//!
//! let statuses = client.get_inflight_bundle_statuses(vec!["abc123".to_string()]).await?;
//! for entry in statuses.entries() {
//!     println!("{} is {}", entry.bundle_id, entry.status);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::error::RelayError;
use super::params::RpcCall;
use super::types::{
    BundleId, BundleStatus, InflightBundleStatus, RpcResponseContext, TipAccount, TransactionEncoding,
};
use crate::confirmation::{BundleConfirmer, BundleStatusSource, ConfirmationResult};
use crate::http::{HttpClient, RpcError};
use crate::log::mask_string;

/// Client for the bundle relay's JSON-RPC API.
///
/// Cloning is cheap: clones share the same connection pool, so one client can
/// drive many concurrent confirmations.
#[derive(Clone)]
pub struct RelayClient {
    http_client: Arc<HttpClient>,
    uuid: Option<String>,
}

impl RelayClient {
    /// Creates a client with the default transport settings.
    ///
    /// An empty `uuid` is treated the same as `None`: no `uuid` query parameter
    /// is sent.
    pub fn new(base_url: Url, uuid: Option<String>) -> Result<Self, anyhow::Error> {
        Ok(Self::with_http_client(HttpClient::new(base_url)?, uuid))
    }

    pub fn with_http_client(http_client: HttpClient, uuid: Option<String>) -> Self {
        Self {
            http_client: Arc::new(http_client),
            uuid: uuid.filter(|u| !u.is_empty()),
        }
    }

    /// Returns the relay address as a string.
    pub fn get_address(&self) -> String {
        self.http_client.base_url().to_string()
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    pub async fn get_last_request_latency(&self) -> Option<Duration> {
        self.http_client.get_latency().await
    }

    /// Endpoint path plus query string for `call`.
    ///
    /// `bundleOnly=true` comes before `uuid`; the `?` is only added when at
    /// least one parameter is present.
    pub fn path_for(&self, call: &RpcCall) -> String {
        let mut query = Vec::new();
        if call.bundle_only() {
            query.push("bundleOnly=true".to_string());
        }
        if let Some(uuid) = &self.uuid {
            let encoded: String = url::form_urlencoded::byte_serialize(uuid.as_bytes()).collect();
            query.push(format!("uuid={}", encoded));
        }

        let path = call.endpoint().path();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query.join("&"))
        }
    }

    pub(crate) async fn dispatch_raw(&self, call: RpcCall) -> Result<Value, RelayError> {
        call.validate()?;
        let path = self.path_for(&call);
        Ok(self
            .http_client
            .call_raw(&path, call.method(), Some(call.params()))
            .await?)
    }

    async fn dispatch<T: DeserializeOwned>(&self, call: RpcCall) -> Result<T, RelayError> {
        let method = call.method();
        let value = self.dispatch_raw(call).await?;
        serde_json::from_value(value).map_err(|source| {
            RpcError::UnexpectedResult {
                method: method.to_string(),
                source,
            }
            .into()
        })
    }

    /// Like `dispatch`, but a `null` result decodes as a context with no entries.
    async fn dispatch_statuses<T: DeserializeOwned>(&self, call: RpcCall) -> Result<RpcResponseContext<T>, RelayError> {
        let method = call.method();
        match self.dispatch_raw(call).await? {
            Value::Null => Ok(RpcResponseContext::default()),
            value => serde_json::from_value(value).map_err(|source| {
                RpcError::UnexpectedResult {
                    method: method.to_string(),
                    source,
                }
                .into()
            }),
        }
    }

    /// Lists the accounts the relay accepts tips on.
    pub async fn get_tip_accounts(&self) -> Result<Vec<TipAccount>, RelayError> {
        debug!("HTTP: Requesting tip accounts");
        self.dispatch(RpcCall::GetTipAccounts).await
    }

    /// Submits a bundle of signed, serialized transactions and returns the id
    /// the relay assigned to it.
    pub async fn send_bundle(
        &self,
        transactions: Vec<String>,
        encoding: Option<TransactionEncoding>,
    ) -> Result<BundleId, RelayError> {
        let count = transactions.len();
        info!(target: "audit", transactions = count; "HTTP: Submitting bundle");

        let result = self.dispatch::<BundleId>(RpcCall::SendBundle { transactions, encoding }).await;
        match &result {
            Ok(bundle_id) => info!(target: "audit", bundle_id = &**bundle_id; "HTTP: Bundle accepted"),
            Err(e) => warn!(target: "audit", error:% = e; "HTTP: Bundle submission failed"),
        }
        result
    }

    /// Submits a single transaction. With `bundle_only` the relay only forwards
    /// it as part of a bundle and never sends it on its own.
    pub async fn send_transaction(
        &self,
        transaction: String,
        encoding: Option<TransactionEncoding>,
        bundle_only: bool,
    ) -> Result<String, RelayError> {
        info!(target: "audit", bundle_only = bundle_only; "HTTP: Submitting transaction");

        let result = self
            .dispatch::<String>(RpcCall::SendTransaction {
                transaction,
                encoding,
                bundle_only,
            })
            .await;
        if let Err(e) = &result {
            warn!(target: "audit", error:% = e; "HTTP: Transaction submission failed");
        }
        result
    }

    /// Fast-path statuses for up to five bundle ids.
    pub async fn get_inflight_bundle_statuses(
        &self,
        bundle_ids: Vec<BundleId>,
    ) -> Result<RpcResponseContext<InflightBundleStatus>, RelayError> {
        debug!(count = bundle_ids.len(); "HTTP: Querying inflight bundle statuses");
        self.dispatch_statuses(RpcCall::GetInflightBundleStatuses { bundle_ids }).await
    }

    /// Detailed statuses for up to five bundle ids. Ids that have not landed
    /// have no entry.
    pub async fn get_bundle_statuses(
        &self,
        bundle_ids: Vec<BundleId>,
    ) -> Result<RpcResponseContext<BundleStatus>, RelayError> {
        debug!(count = bundle_ids.len(); "HTTP: Querying bundle statuses");
        self.dispatch_statuses(RpcCall::GetBundleStatuses { bundle_ids }).await
    }

    /// Polls until `bundle_id` lands, fails, or `timeout` passes.
    ///
    /// Never returns an error: transient failures are ridden out and an expired
    /// deadline is reported as [`ConfirmationResult::Timeout`].
    pub async fn confirm_inflight_bundle(&self, bundle_id: &str, timeout: Duration) -> ConfirmationResult {
        BundleConfirmer::new(self.clone()).confirm(bundle_id, timeout).await
    }

    /// Like [`confirm_inflight_bundle`](Self::confirm_inflight_bundle), but
    /// stops early with [`ConfirmationResult::Cancelled`] when `cancel` fires.
    pub async fn confirm_inflight_bundle_with_cancel(
        &self,
        bundle_id: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ConfirmationResult {
        BundleConfirmer::new(self.clone())
            .confirm_with_cancel(bundle_id, timeout, Some(cancel))
            .await
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("base_url", &self.get_address())
            .field("uuid", &self.uuid.as_deref().map(mask_string))
            .finish()
    }
}

impl BundleStatusSource for RelayClient {
    async fn inflight_status(&self, bundle_id: &str) -> Result<Option<InflightBundleStatus>, RelayError> {
        Ok(self
            .get_inflight_bundle_statuses(vec![bundle_id.to_string()])
            .await?
            .into_first())
    }

    async fn bundle_status(&self, bundle_id: &str) -> Result<Option<BundleStatus>, RelayError> {
        Ok(self.get_bundle_statuses(vec![bundle_id.to_string()]).await?.into_first())
    }
}
