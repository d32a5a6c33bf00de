//! Bundle relay operations.
//!
//! - [`RelayClient`] - routes each operation to its endpoint and query string
//! - [`RpcCall`] - typed parameters, one variant per JSON-RPC method
//! - [`RelayError`] - errors surfaced to direct callers
//! - Status records ([`InflightBundleStatus`], [`BundleStatus`]) as returned by
//!   the relay
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | list tip accounts | `getTipAccounts` | `/bundles` |
//! | send bundle | `sendBundle` | `/bundles` |
//! | send transaction | `sendTransaction` | `/transactions` |
//! | inflight statuses | `getInflightBundleStatuses` | `/bundles` |
//! | detailed statuses | `getBundleStatuses` | `/bundles` |

mod error;
mod params;
mod relay_client;
mod tip_accounts;
mod types;

pub use error::RelayError;
pub use params::{Endpoint, MAX_BATCH_SIZE, RpcCall};
pub use relay_client::RelayClient;
pub use tip_accounts::choose_tip_account;
pub use types::{
    BundleId, BundleStatus, ConfirmationStatus, InflightBundleStatus, InflightStatus, RpcContext, RpcResponseContext,
    TipAccount, TransactionEncoding,
};
