use thiserror::Error;

use crate::http::RpcError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Relay returned no tip accounts")]
    NoTipAccounts,

    #[error("Invalid parameters for `{method}`: {reason}")]
    InvalidParams { method: &'static str, reason: String },
}
