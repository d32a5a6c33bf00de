use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;

use super::error::RelayError;
use super::params::RpcCall;
use super::relay_client::RelayClient;
use super::types::TipAccount;

impl RelayClient {
    /// Fetches the tip accounts and returns one chosen uniformly at random.
    ///
    /// Nothing is cached: every call asks the relay again.
    pub async fn get_random_tip_account(&self) -> Result<TipAccount, RelayError> {
        let result = self.dispatch_raw(RpcCall::GetTipAccounts).await?;
        let accounts = tip_accounts_from_value(result);
        let account = choose_tip_account(&accounts, &mut rand::thread_rng())?.clone();
        debug!(candidates = accounts.len(); "Picked random tip account");
        Ok(account)
    }
}

/// Picks one account uniformly from `accounts`.
pub fn choose_tip_account<'a, R: Rng + ?Sized>(
    accounts: &'a [TipAccount],
    rng: &mut R,
) -> Result<&'a TipAccount, RelayError> {
    accounts.choose(rng).ok_or(RelayError::NoTipAccounts)
}

/// Anything other than an array of strings counts as no accounts.
fn tip_accounts_from_value(value: Value) -> Vec<TipAccount> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(account) if !account.is_empty() => Some(account),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
