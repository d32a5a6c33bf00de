//! Client for a block-engine bundle relay.
//!
//! [`RelayClient`] speaks JSON-RPC 2.0 to the relay's `/bundles` and
//! `/transactions` endpoints; [`BundleConfirmer`] polls a submitted bundle to
//! a terminal [`ConfirmationResult`].

pub mod cli;
pub mod config;
pub mod confirmation;
pub mod http;
pub mod log;
pub mod relay;

pub use crate::config::RelayConfig;
pub use crate::confirmation::{BundleConfirmer, ConfirmationResult};
pub use crate::relay::{RelayClient, RelayError};
