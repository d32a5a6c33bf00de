use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use super::diagnostics::Diagnostics;
use super::error::{HttpError, RpcError};
use super::types::{JsonRpcRequest, JsonRpcResponse};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// JSON-RPC 2.0 over HTTP POST.
///
/// Safe to share between tasks: the inner reqwest client pools connections
/// and the latency slot is behind an async lock.
pub struct HttpClient {
    base_url: Url,
    client: reqwest_middleware::ClientWithMiddleware,
    diagnostics: Option<Arc<dyn Diagnostics>>,
    last_latency: RwLock<Option<(Duration, Instant)>>,
}

impl HttpClient {
    pub fn new(base_url: Url) -> Result<Self, anyhow::Error> {
        Self::with_config(base_url, DEFAULT_MAX_RETRIES, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// `timeout` applies to each request on its own, independent of any
    /// deadline the caller is working towards.
    pub fn with_config(base_url: Url, max_retries: u32, timeout: Duration) -> Result<Self, anyhow::Error> {
        let retry_policy = reqwest_retry::policies::ExponentialBackoff::builder().build_with_max_retries(max_retries);

        let inner_client = reqwest::Client::builder().timeout(timeout).build()?;

        let client = reqwest_middleware::ClientBuilder::new(inner_client)
            .with(reqwest_retry::RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            base_url,
            client,
            diagnostics: None,
            last_latency: RwLock::new(None),
        })
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path_and_query` to the base URL verbatim, so a base URL with a
    /// path prefix such as `/api/v1` keeps it.
    pub fn endpoint_url(&self, path_and_query: &str) -> Result<Url, HttpError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path_and_query))?)
    }

    /// Sends `method` with `params` and decodes `result` into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        path_and_query: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, RpcError> {
        let value = self.call_raw(path_and_query, method, params).await?;
        serde_json::from_value(value).map_err(|source| RpcError::UnexpectedResult {
            method: method.to_string(),
            source,
        })
    }

    /// Sends `method` with `params` and returns the undecoded `result` member.
    pub async fn call_raw(&self, path_and_query: &str, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        let url = self.endpoint_url(path_and_query)?;
        let request = JsonRpcRequest::new(method, params);
        let response = self.send_request(url, &request).await?;

        match (response.result, response.error) {
            (_, Some(error)) => Err(RpcError::Protocol(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::MissingResult {
                method: method.to_string(),
            }),
        }
    }

    async fn send_request(&self, url: Url, request: &JsonRpcRequest) -> Result<JsonRpcResponse<Value>, RpcError> {
        if let Some(diagnostics) = &self.diagnostics {
            diagnostics.on_request(&url, request);
        }

        let start = Instant::now();
        let body = serde_json::to_string(request).map_err(HttpError::from)?;
        let resp = self
            .client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(HttpError::from)?;

        let status = resp.status();
        let text = resp.text().await.map_err(HttpError::from)?;
        self.update_latency(start.elapsed()).await;

        if let Some(diagnostics) = &self.diagnostics {
            diagnostics.on_response(&url, status, &text);
        }

        if !status.is_success() {
            // Relays report rejected calls (rate limits, bad params) as JSON-RPC
            // errors on 4xx responses.
            if let Ok(JsonRpcResponse { error: Some(error), .. }) = serde_json::from_str::<JsonRpcResponse<Value>>(&text) {
                return Err(RpcError::Protocol(error));
            }
            return Err(HttpError::ServerError { status, body: text }.into());
        }

        Ok(serde_json::from_str(&text).map_err(HttpError::from)?)
    }

    async fn update_latency(&self, duration: Duration) {
        *self.last_latency.write().await = Some((duration, Instant::now()));
    }

    pub async fn get_latency(&self) -> Option<Duration> {
        self.last_latency.read().await.map(|(d, _)| d)
    }
}
