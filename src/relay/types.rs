use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

/// Identifier the relay assigns to an accepted bundle.
pub type BundleId = String;

/// Account the relay designates for tip payments.
pub type TipAccount = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionEncoding {
    Base58,
    Base64,
}

impl Display for TransactionEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionEncoding::Base58 => write!(f, "base58"),
            TransactionEncoding::Base64 => write!(f, "base64"),
        }
    }
}

impl FromStr for TransactionEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base58" => Ok(TransactionEncoding::Base58),
            "base64" => Ok(TransactionEncoding::Base64),
            other => Err(format!("unknown transaction encoding '{}', expected base58 or base64", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

/// `{context, value}` wrapper shared by both status queries.
///
/// The relay may omit `value`, send `null`, or put `null` in place of an
/// unknown id, so all three collapse to "no entry".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponseContext<T> {
    pub context: Option<RpcContext>,
    pub value: Option<Vec<Option<T>>>,
}

impl<T> Default for RpcResponseContext<T> {
    fn default() -> Self {
        Self {
            context: None,
            value: None,
        }
    }
}

impl<T> RpcResponseContext<T> {
    pub fn entries(self) -> Vec<T> {
        self.value.unwrap_or_default().into_iter().flatten().collect()
    }

    pub fn into_first(self) -> Option<T> {
        self.value.unwrap_or_default().into_iter().flatten().next()
    }
}

/// Fast-path status of a bundle still moving through the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InflightStatus {
    /// The relay has no record of the id in its lookback window.
    Invalid,
    Pending,
    Failed,
    Landed,
    #[serde(other)]
    Unknown,
}

impl Display for InflightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InflightStatus::Invalid => write!(f, "Invalid"),
            InflightStatus::Pending => write!(f, "Pending"),
            InflightStatus::Failed => write!(f, "Failed"),
            InflightStatus::Landed => write!(f, "Landed"),
            InflightStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflightBundleStatus {
    pub bundle_id: BundleId,
    pub status: InflightStatus,
    #[serde(default)]
    pub landed_slot: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
    #[serde(other)]
    Unknown,
}

/// Detailed status, only available once a bundle has landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleStatus {
    pub bundle_id: BundleId,
    #[serde(default)]
    pub transactions: Vec<String>,
    pub slot: u64,
    #[serde(default)]
    pub confirmation_status: Option<ConfirmationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<Value>,
}
