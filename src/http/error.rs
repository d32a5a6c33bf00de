//! Error types for the JSON-RPC transport.
//!
//! Two layers are distinguished:
//!
//! - [`HttpError`] covers everything that goes wrong before a JSON-RPC envelope
//!   could be read: connection failures, timeouts, non-success statuses without
//!   a JSON-RPC body, bodies that are not JSON.
//! - [`RpcError`] is what a JSON-RPC call returns. It wraps [`HttpError`] as
//!   its transport variant and adds the protocol-level failures reported by the
//!   relay itself.

use thiserror::Error;

use super::types::RpcErrorObject;

/// Transport-level failures talking to the relay.
///
/// # Error Categories
///
/// - **Network errors**: [`RequestFailed`](HttpError::RequestFailed),
///   [`MiddlewareError`](HttpError::MiddlewareError)
/// - **Server errors**: [`ServerError`](HttpError::ServerError)
/// - **Client errors**: [`UrlError`](HttpError::UrlError),
///   [`JsonError`](HttpError::JsonError)
#[derive(Debug, Error)]
pub enum HttpError {
    /// The HTTP request failed due to a network or connection error.
    ///
    /// This typically indicates connectivity issues such as:
    /// - Connection refused (relay unreachable)
    /// - The per-request timeout elapsed
    /// - DNS resolution failure
    /// - TLS/SSL handshake errors
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// An error occurred in the HTTP middleware layer.
    ///
    /// The middleware handles transient retries. This error may indicate that
    /// all retry attempts have been exhausted.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    /// The relay returned a non-success HTTP status code and the body was not a
    /// JSON-RPC error envelope.
    #[error("Server error {status}: {body}")]
    ServerError {
        /// The HTTP status code returned by the relay.
        status: reqwest::StatusCode,
        /// The response body, which may contain error details.
        body: String,
    },

    /// Joining the base URL with an endpoint path produced an invalid URL.
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// The request could not be serialized or the response body was not JSON.
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Failure of a single JSON-RPC call.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The call never produced a JSON-RPC envelope.
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// The relay answered with a JSON-RPC `error` object.
    #[error("JSON-RPC error {}: {}", .0.code, .0.message)]
    Protocol(RpcErrorObject),

    /// The envelope carried neither `result` nor `error`.
    #[error("JSON-RPC response to `{method}` has neither result nor error")]
    MissingResult { method: String },

    /// The `result` member did not have the shape the caller expected.
    #[error("Unexpected result for `{method}`: {source}")]
    UnexpectedResult {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    /// Returns the JSON-RPC error code when the relay rejected the call.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Protocol(obj) => Some(obj.code),
            _ => None,
        }
    }

    /// True for failures that happened below the JSON-RPC layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }
}
