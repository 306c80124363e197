use std::sync::{Arc, Mutex};

use tracing::info;
use url::Url;

use rusty_dapp_signing_core::{
    PortError, ProviderType, SignOptions, SignOutcome, SigningProvider, Transaction,
};

use crate::SigningAdapterConfig;

/// Hands batches to the hosted web wallet through its `/hook/sign` page.
/// The wallet reports back by redirecting to the callback URL.
#[derive(Debug, Clone)]
pub struct WebWalletAdapter {
    wallet_base_url: String,
    last_redirect: Arc<Mutex<Option<String>>>,
}

impl WebWalletAdapter {
    pub fn with_config(config: &SigningAdapterConfig) -> Self {
        Self {
            wallet_base_url: config.wallet_base_url.trim_end_matches('/').to_owned(),
            last_redirect: Arc::new(Mutex::new(None)),
        }
    }

    pub fn sign_url(
        &self,
        transactions: &[Transaction],
        callback_url: &str,
    ) -> Result<String, PortError> {
        let mut url = Url::parse(&format!("{}/hook/sign", self.wallet_base_url))
            .map_err(|e| PortError::Validation(format!("wallet url: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (i, tx) in transactions.iter().enumerate() {
                pairs
                    .append_pair(&format!("receiver[{i}]"), &tx.receiver.to_string())
                    .append_pair(&format!("value[{i}]"), &tx.value.to_string())
                    .append_pair(&format!("gasLimit[{i}]"), &tx.gas_limit.to_string())
                    .append_pair(&format!("gasPrice[{i}]"), &tx.gas_price.to_string())
                    .append_pair(&format!("nonce[{i}]"), &tx.nonce.to_string())
                    .append_pair(&format!("chainID[{i}]"), tx.chain_id.as_str())
                    .append_pair(&format!("version[{i}]"), &tx.version.to_string());
                if let Some(data) = tx.data.as_deref().filter(|d| !d.is_empty()) {
                    pairs.append_pair(&format!("data[{i}]"), data);
                }
            }
            pairs.append_pair("callbackUrl", callback_url);
        }
        Ok(url.to_string())
    }

    pub fn last_redirect(&self) -> Result<Option<String>, PortError> {
        let g = self
            .last_redirect
            .lock()
            .map_err(|e| PortError::Transport(format!("web wallet lock poisoned: {e}")))?;
        Ok(g.clone())
    }
}

impl SigningProvider for WebWalletAdapter {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Wallet
    }

    fn sign_transactions(
        &self,
        transactions: &[Transaction],
        options: &SignOptions,
    ) -> Result<SignOutcome, PortError> {
        let callback_url = options
            .callback_url
            .as_deref()
            .ok_or_else(|| PortError::Validation("web wallet needs a callback url".to_owned()))?;
        if transactions.is_empty() {
            return Err(PortError::Validation("empty batch".to_owned()));
        }
        let url = self.sign_url(transactions, callback_url)?;
        info!(count = transactions.len(), "redirecting to web wallet");
        let mut g = self
            .last_redirect
            .lock()
            .map_err(|e| PortError::Transport(format!("web wallet lock poisoned: {e}")))?;
        *g = Some(url.clone());
        Ok(SignOutcome::Redirected { url })
    }
}
