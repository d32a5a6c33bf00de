//! Optional request/response tracing for the transport.
//!
//! The transport holds an `Option<Arc<dyn Diagnostics>>`. When it is `None`
//! nothing is emitted for individual RPC exchanges.

use log::debug;
use reqwest::StatusCode;
use url::Url;

use super::types::JsonRpcRequest;
use crate::log::mask_string;

/// Sink for raw JSON-RPC exchanges.
pub trait Diagnostics: Send + Sync {
    fn on_request(&self, url: &Url, request: &JsonRpcRequest);

    fn on_response(&self, url: &Url, status: StatusCode, body: &str);
}

/// Writes exchanges to the `bundle_relay::rpc` log target at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn on_request(&self, url: &Url, request: &JsonRpcRequest) {
        let params = request.params.to_string();
        debug!(
            target: "bundle_relay::rpc",
            url = &*redacted_url(url),
            method = &*request.method,
            params = &*params;
            "RPC request"
        );
    }

    fn on_response(&self, url: &Url, status: StatusCode, body: &str) {
        debug!(
            target: "bundle_relay::rpc",
            url = &*redacted_url(url),
            status = status.as_u16(),
            body = body;
            "RPC response"
        );
    }
}

/// Renders `url` with the client `uuid` query value masked.
pub fn redacted_url(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "uuid") {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "uuid" { mask_string(&v) } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
