//! In-app signers for the extension, ledger and wallet-connect providers.

use std::time::Duration;

use alloy::primitives::{hex, keccak256};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use rusty_dapp_signing_core::{
    PortError, ProviderType, SignOptions, SignOutcome, SigningProvider, Transaction,
};

use crate::SigningAdapterConfig;

#[derive(Debug, Clone)]
pub struct BridgeSignerAdapter {
    provider_type: ProviderType,
    mode: SignerMode,
}

#[derive(Debug, Clone)]
enum SignerMode {
    Disabled(String),
    /// Local keccak-derived signatures; never accepted by a real network.
    Deterministic,
    Bridge(BridgeRuntime),
}

#[derive(Debug, Clone)]
struct BridgeRuntime {
    sign_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    error: Option<String>,
}

impl BridgeSignerAdapter {
    pub fn with_config(provider_type: ProviderType, config: &SigningAdapterConfig) -> Self {
        if provider_type == ProviderType::Wallet {
            return Self::disabled(provider_type, "web wallet signs through a redirect");
        }
        let mode = match config.signer_bridge_url {
            Some(ref base_url) => {
                let timeout = Duration::from_millis(config.http_timeout_ms);
                match reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .user_agent(config.user_agent.clone())
                    .build()
                {
                    Ok(client) => SignerMode::Bridge(BridgeRuntime {
                        sign_url: format!(
                            "{}/{}/sign",
                            base_url.trim_end_matches('/'),
                            provider_type.as_str()
                        ),
                        client,
                    }),
                    Err(e) => SignerMode::Disabled(format!(
                        "failed to initialize signer bridge client: {e}"
                    )),
                }
            }
            None => SignerMode::Deterministic,
        };
        Self {
            provider_type,
            mode,
        }
    }

    pub fn extension(config: &SigningAdapterConfig) -> Self {
        Self::with_config(ProviderType::Extension, config)
    }

    pub fn ledger(config: &SigningAdapterConfig) -> Self {
        Self::with_config(ProviderType::Ledger, config)
    }

    pub fn wallet_connect(config: &SigningAdapterConfig) -> Self {
        Self::with_config(ProviderType::WalletConnect, config)
    }

    pub fn deterministic(provider_type: ProviderType) -> Self {
        Self {
            provider_type,
            mode: SignerMode::Deterministic,
        }
    }

    pub fn disabled(provider_type: ProviderType, reason: impl Into<String>) -> Self {
        Self {
            provider_type,
            mode: SignerMode::Disabled(reason.into()),
        }
    }

    pub fn is_bridged(&self) -> bool {
        matches!(self.mode, SignerMode::Bridge(_))
    }

    fn deterministic_signature(&self, tx: &Transaction) -> Result<String, PortError> {
        let mut seed = Vec::new();
        seed.extend_from_slice(self.provider_type.as_str().as_bytes());
        seed.extend_from_slice(
            &serde_json::to_vec(&tx.unsigned())
                .map_err(|e| PortError::Validation(format!("transaction encode failed: {e}")))?,
        );
        let hash = keccak256(seed);
        let mut sig = Vec::with_capacity(64);
        sig.extend_from_slice(hash.as_slice());
        sig.extend_from_slice(keccak256(hash).as_slice());
        Ok(hex::encode(sig))
    }

    fn bridge_sign(
        &self,
        bridge: &BridgeRuntime,
        transactions: &[Transaction],
    ) -> Result<Vec<Transaction>, PortError> {
        let payload = json!({
            "provider": self.provider_type.as_str(),
            "transactions": transactions,
        });
        let response = bridge
            .client
            .post(&bridge.sign_url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("signer bridge request failed: {e}")))?;
        let status = response.status();
        let body: BridgeResponse = response
            .json()
            .map_err(|e| PortError::Transport(format!("signer bridge json decode failed: {e}")))?;
        if let Some(err) = body.error {
            return Err(PortError::Rejected(err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!("signer bridge status {status}")));
        }
        body.transactions
            .ok_or_else(|| PortError::Transport("signer bridge missing transactions".to_owned()))
    }
}

impl SigningProvider for BridgeSignerAdapter {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn sign_transactions(
        &self,
        transactions: &[Transaction],
        _options: &SignOptions,
    ) -> Result<SignOutcome, PortError> {
        let signed = match &self.mode {
            SignerMode::Disabled(reason) => {
                warn!(provider_type = %self.provider_type, %reason, "signer disabled");
                return Err(PortError::Validation(reason.clone()));
            }
            SignerMode::Deterministic => transactions
                .iter()
                .map(|tx| {
                    Ok(Transaction {
                        signature: Some(self.deterministic_signature(tx)?),
                        ..tx.clone()
                    })
                })
                .collect::<Result<Vec<_>, PortError>>()?,
            SignerMode::Bridge(bridge) => self.bridge_sign(bridge, transactions)?,
        };
        if signed.iter().any(|tx| tx.signature.as_deref().unwrap_or("").is_empty()) {
            return Err(PortError::Validation("signer returned an unsigned transaction".to_owned()));
        }
        debug!(provider_type = %self.provider_type, count = signed.len(), "transactions signed");
        Ok(SignOutcome::Signed(signed))
    }
}
