use serde::{Serialize, Serializer};

use crate::relay::{BundleStatus, InflightBundleStatus};

/// Terminal value of a confirmation.
///
/// Serializes as the underlying status record, or as `{"status":"Timeout"}` /
/// `{"status":"Cancelled"}` for the two synthetic outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationResult {
    /// Landed, with the detailed record.
    Landed(BundleStatus),
    /// Landed, but the detailed record was not available.
    LandedInflight(InflightBundleStatus),
    Failed(InflightBundleStatus),
    Timeout,
    Cancelled,
}

impl ConfirmationResult {
    pub fn status(&self) -> &'static str {
        match self {
            ConfirmationResult::Landed(_) | ConfirmationResult::LandedInflight(_) => "Landed",
            ConfirmationResult::Failed(_) => "Failed",
            ConfirmationResult::Timeout => "Timeout",
            ConfirmationResult::Cancelled => "Cancelled",
        }
    }

    pub fn is_landed(&self) -> bool {
        matches!(
            self,
            ConfirmationResult::Landed(_) | ConfirmationResult::LandedInflight(_)
        )
    }

    pub fn landed_slot(&self) -> Option<u64> {
        match self {
            ConfirmationResult::Landed(detail) => Some(detail.slot),
            ConfirmationResult::LandedInflight(inflight) => inflight.landed_slot,
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct SyntheticStatus {
    status: &'static str,
}

impl Serialize for ConfirmationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfirmationResult::Landed(detail) => detail.serialize(serializer),
            ConfirmationResult::LandedInflight(inflight) | ConfirmationResult::Failed(inflight) => {
                inflight.serialize(serializer)
            },
            ConfirmationResult::Timeout | ConfirmationResult::Cancelled => SyntheticStatus {
                status: self.status(),
            }
            .serialize(serializer),
        }
    }
}
