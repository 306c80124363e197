//! Bridge between the egui shell and the signing workspace crates.
//! The shell builds providers and reaches the network only through here.

use std::sync::Arc;

use eyre::WrapErr;

use rusty_dapp_signing_adapters::{
    BridgeSignerAdapter, HttpNetworkApi, SigningAdapterConfig, SystemClockAdapter,
    WebWalletAdapter,
};
use rusty_dapp_signing_core::{
    CoordinatorConfig, DappStore, NetworkConfig, PortError, ProviderType, SigningProvider,
    Transaction,
};

pub struct SigningBridge {
    config: SigningAdapterConfig,
    coordinator_config: CoordinatorConfig,
    api: Arc<HttpNetworkApi>,
    clock: SystemClockAdapter,
}

impl SigningBridge {
    pub fn from_env() -> eyre::Result<Self> {
        let config = SigningAdapterConfig::from_env()?;
        let origin = std::env::var("RUSTY_DAPP_ORIGIN")
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| CoordinatorConfig::default().origin);
        Self::with_config(
            config,
            CoordinatorConfig {
                origin,
                ..CoordinatorConfig::default()
            },
        )
    }

    pub fn with_config(
        config: SigningAdapterConfig,
        coordinator_config: CoordinatorConfig,
    ) -> eyre::Result<Self> {
        let api = HttpNetworkApi::with_config(&config).wrap_err("network api client")?;
        Ok(Self {
            config,
            coordinator_config,
            api: Arc::new(api),
            clock: SystemClockAdapter,
        })
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.config.network
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        self.coordinator_config.clone()
    }

    pub fn api(&self) -> Arc<HttpNetworkApi> {
        Arc::clone(&self.api)
    }

    pub fn provider(&self, provider_type: ProviderType) -> Arc<dyn SigningProvider> {
        match provider_type {
            ProviderType::Wallet => Arc::new(WebWalletAdapter::with_config(&self.config)),
            other => Arc::new(BridgeSignerAdapter::with_config(other, &self.config)),
        }
    }

    /// Whether in-app signers talk to a real signer bridge.
    pub fn has_signer_bridge(&self) -> bool {
        self.config.signer_bridge_url.is_some()
    }

    pub fn send_transactions(
        &self,
        store: &mut DappStore,
        transactions: Vec<Transaction>,
        callback_route: &str,
    ) -> Result<String, PortError> {
        store.send_transactions(&self.clock, transactions, callback_route)
    }
}
