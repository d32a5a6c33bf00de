//! Typed parameters for every relay method.
//!
//! Each [`RpcCall`] variant knows its method name, the endpoint it is routed
//! to, and how its positional `params` array looks on the wire. Shapes are
//! checked by [`RpcCall::validate`] before anything is sent.

use serde_json::{Value, json};

use super::error::RelayError;
use super::types::{BundleId, TransactionEncoding};

/// Upper bound the relay places on transactions per bundle and on ids per
/// status query.
pub const MAX_BATCH_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Bundles,
    Transactions,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Bundles => "/bundles",
            Endpoint::Transactions => "/transactions",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RpcCall {
    GetTipAccounts,
    SendBundle {
        transactions: Vec<String>,
        encoding: Option<TransactionEncoding>,
    },
    SendTransaction {
        transaction: String,
        encoding: Option<TransactionEncoding>,
        bundle_only: bool,
    },
    GetInflightBundleStatuses {
        bundle_ids: Vec<BundleId>,
    },
    GetBundleStatuses {
        bundle_ids: Vec<BundleId>,
    },
}

impl RpcCall {
    pub fn method(&self) -> &'static str {
        match self {
            RpcCall::GetTipAccounts => "getTipAccounts",
            RpcCall::SendBundle { .. } => "sendBundle",
            RpcCall::SendTransaction { .. } => "sendTransaction",
            RpcCall::GetInflightBundleStatuses { .. } => "getInflightBundleStatuses",
            RpcCall::GetBundleStatuses { .. } => "getBundleStatuses",
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            RpcCall::SendTransaction { .. } => Endpoint::Transactions,
            _ => Endpoint::Bundles,
        }
    }

    pub fn bundle_only(&self) -> bool {
        matches!(self, RpcCall::SendTransaction { bundle_only: true, .. })
    }

    /// Positional params. Status queries take a batch of id batches; only a
    /// single batch is ever sent.
    pub fn params(&self) -> Value {
        match self {
            RpcCall::GetTipAccounts => json!([]),
            RpcCall::SendBundle { transactions, encoding } => with_encoding(json!(transactions), *encoding),
            RpcCall::SendTransaction {
                transaction, encoding, ..
            } => with_encoding(json!(transaction), *encoding),
            RpcCall::GetInflightBundleStatuses { bundle_ids } | RpcCall::GetBundleStatuses { bundle_ids } => {
                json!([bundle_ids])
            },
        }
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        match self {
            RpcCall::GetTipAccounts => Ok(()),
            RpcCall::SendBundle { transactions, .. } => check_batch(self.method(), "transactions", transactions),
            RpcCall::SendTransaction { transaction, .. } => {
                if transaction.is_empty() {
                    return Err(self.invalid("transaction payload is empty"));
                }
                Ok(())
            },
            RpcCall::GetInflightBundleStatuses { bundle_ids } | RpcCall::GetBundleStatuses { bundle_ids } => {
                check_batch(self.method(), "bundle ids", bundle_ids)
            },
        }
    }

    fn invalid(&self, reason: &str) -> RelayError {
        RelayError::InvalidParams {
            method: self.method(),
            reason: reason.to_string(),
        }
    }
}

fn with_encoding(first: Value, encoding: Option<TransactionEncoding>) -> Value {
    match encoding {
        Some(encoding) => json!([first, { "encoding": encoding }]),
        None => json!([first]),
    }
}

fn check_batch(method: &'static str, what: &str, items: &[String]) -> Result<(), RelayError> {
    let reason = if items.is_empty() {
        format!("at least one of {} is required", what)
    } else if items.len() > MAX_BATCH_SIZE {
        format!("at most {} {} allowed, got {}", MAX_BATCH_SIZE, what, items.len())
    } else if items.iter().any(|item| item.is_empty()) {
        format!("{} must not contain empty entries", what)
    } else {
        return Ok(());
    };
    Err(RelayError::InvalidParams { method, reason })
}
