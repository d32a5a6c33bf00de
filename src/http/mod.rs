//! JSON-RPC 2.0 transport for the bundle relay.
//!
//! This module knows how to put a method name and positional parameters on the
//! wire and how to read the answer back. It knows nothing about bundles: the
//! mapping of operations to endpoints lives in [`crate::relay`].
//!
//! # Architecture
//!
//! - [`HttpClient`] - POSTs envelopes to `base_url + path` and decodes results
//! - [`HttpError`] / [`RpcError`] - transport and protocol failures
//! - [`Diagnostics`] - optional sink for raw request/response pairs
//!
//! # Features
//!
//! - **Per-request timeout**: each request fails on its own once `timeout`
//!   passes, independent of any caller deadline
//! - **Optional transient retries**: exponential backoff middleware, disabled
//!   unless `max_retries` is set
//! - **Latency tracking**: round-trip time of the last request
//!
//! # Example
//!
//! ```rust,no_run
//! use url::Url;
//! use bundle_relay::http::HttpClient;
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = HttpClient::new(Url::parse("https://mainnet.block-engine.jito.wtf/api/v1")?)?;
//! let accounts: Vec<String> = client.call("/bundles", "getTipAccounts", None).await?;
//! println!("{} tip accounts", accounts.len());
//! # Ok(())
//! # }
//! ```

mod diagnostics;
mod error;
mod http_client;
mod types;

pub use diagnostics::{Diagnostics, LogDiagnostics, redacted_url};
pub use error::{HttpError, RpcError};
pub use http_client::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, HttpClient};
pub use types::{JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse, REQUEST_ID, RpcErrorObject};
