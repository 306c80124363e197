//! Web-wallet redirect contract: the callback URL handed to the wallet and
//! the parameters it appends when it sends the user back.

use std::collections::BTreeMap;

use url::Url;

use crate::domain::Transaction;
use crate::error::SigningError;

/// Query parameter carrying the batch session id through the wallet redirect.
pub const WALLET_SIGN_SESSION: &str = "signSession";
pub const WALLET_PROVIDER_STATUS: &str = "walletProviderStatus";
pub const TRANSACTIONS_SIGNED: &str = "transactionsSigned";
pub const TRANSACTIONS_CANCELLED: &str = "transactionsCancelled";

/// Appends `params` to `callback_url`, keeping any query it already has.
pub fn reply_url(callback_url: &str, params: &[(&str, &str)]) -> Result<String, SigningError> {
    let mut url =
        Url::parse(callback_url).map_err(|e| SigningError::InvalidCallbackUrl(e.to_string()))?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

/// `<origin><callbackRoute>?signSession=<id>`, percent-encoded once more.
/// A route without a leading `/` is treated as a path under the origin.
pub fn wallet_callback_url(
    origin: &str,
    callback_route: &str,
    session_id: &str,
) -> Result<String, SigningError> {
    let origin = origin.trim_end_matches('/');
    let base = if callback_route.starts_with('/') {
        format!("{origin}{callback_route}")
    } else {
        format!("{origin}/{callback_route}")
    };
    let reply = reply_url(&base, &[(WALLET_SIGN_SESSION, session_id)])?;
    Ok(urlencoding::encode(&reply).into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCallbackOutcome {
    Signed {
        signatures: Vec<String>,
        nonces: Vec<Option<u64>>,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletCallback {
    pub session_id: String,
    pub outcome: WalletCallbackOutcome,
}

/// Reads a wallet redirect. `Ok(None)` when the URL is not a signing callback.
pub fn parse_wallet_callback(url: &str) -> Result<Option<WalletCallback>, SigningError> {
    let url = Url::parse(url).map_err(|e| SigningError::InvalidCallbackUrl(e.to_string()))?;

    let mut session_id = None;
    let mut provider_status = None;
    let mut status = None;
    let mut signatures = BTreeMap::new();
    let mut nonces = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            WALLET_SIGN_SESSION => session_id = Some(value.into_owned()),
            WALLET_PROVIDER_STATUS => provider_status = Some(value.into_owned()),
            "status" => status = Some(value.into_owned()),
            other => {
                if let Some(index) = indexed_key(other, "signature") {
                    signatures.insert(index, value.into_owned());
                } else if let Some(index) = indexed_key(other, "nonce") {
                    nonces.insert(index, value.parse::<u64>().ok());
                }
            }
        }
    }

    let Some(session_id) = session_id.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let cancelled = status.as_deref() == Some("cancelled")
        || provider_status.as_deref() == Some(TRANSACTIONS_CANCELLED);
    let outcome = if cancelled {
        WalletCallbackOutcome::Cancelled
    } else if provider_status.as_deref() == Some(TRANSACTIONS_SIGNED) {
        let count = signatures.keys().next_back().map(|i| i + 1).unwrap_or(0);
        WalletCallbackOutcome::Signed {
            signatures: (0..count)
                .map(|i| signatures.get(&i).cloned().unwrap_or_default())
                .collect(),
            nonces: (0..count).map(|i| nonces.get(&i).copied().flatten()).collect(),
        }
    } else {
        return Ok(None);
    };
    Ok(Some(WalletCallback {
        session_id,
        outcome,
    }))
}

fn indexed_key(key: &str, name: &str) -> Option<usize> {
    key.strip_prefix(name)?
        .strip_prefix('[')?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Attaches returned signatures (and nonces, when the wallet echoed them) to
/// the batch transactions in order.
pub fn apply_signatures(
    transactions: &[Transaction],
    signatures: &[String],
    nonces: &[Option<u64>],
) -> Vec<Transaction> {
    transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            let mut signed = tx.clone();
            if let Some(sig) = signatures.get(i).filter(|s| !s.is_empty()) {
                signed.signature = Some(sig.clone());
            }
            if let Some(Some(nonce)) = nonces.get(i) {
                signed.nonce = *nonce;
            }
            signed
        })
        .collect()
}
