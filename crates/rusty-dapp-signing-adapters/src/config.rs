use rusty_dapp_signing_core::NetworkConfig;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown network preset: {0}")]
    UnknownNetwork(String),
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SigningAdapterConfig {
    pub network: NetworkConfig,
    pub api_base_url: String,
    pub wallet_base_url: String,
    pub http_timeout_ms: u64,
    pub user_agent: String,
    /// When set, extension/ledger/wallet-connect signing is proxied here.
    pub signer_bridge_url: Option<String>,
}

impl Default for SigningAdapterConfig {
    fn default() -> Self {
        Self::for_network(NetworkConfig::default())
    }
}

impl SigningAdapterConfig {
    pub fn for_network(network: NetworkConfig) -> Self {
        Self {
            api_base_url: network.api_address.clone(),
            wallet_base_url: network.wallet_address.clone(),
            network,
            http_timeout_ms: 15_000,
            user_agent: concat!("rusty-dapp/", env!("CARGO_PKG_VERSION")).to_owned(),
            signer_bridge_url: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let network = match get("RUSTY_DAPP_NETWORK") {
            Some(id) => NetworkConfig::by_id(&id).ok_or(ConfigError::UnknownNetwork(id))?,
            None => NetworkConfig::default(),
        };
        let mut config = Self::for_network(network);

        if let Some(url) = get("RUSTY_DAPP_API_URL") {
            config.api_base_url = validated_url("RUSTY_DAPP_API_URL", url)?;
        }
        if let Some(url) = get("RUSTY_DAPP_WALLET_URL") {
            config.wallet_base_url = validated_url("RUSTY_DAPP_WALLET_URL", url)?;
        }
        if let Some(raw) = get("RUSTY_DAPP_TIMEOUT_MS") {
            config.http_timeout_ms = raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::Invalid {
                    name: "RUSTY_DAPP_TIMEOUT_MS",
                    value: raw,
                })?;
        }
        if let Some(url) = get("RUSTY_DAPP_SIGNER_URL") {
            config.signer_bridge_url = Some(validated_url("RUSTY_DAPP_SIGNER_URL", url)?);
        }
        Ok(config)
    }
}

fn validated_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    match url::Url::parse(&value) {
        Ok(_) => Ok(value.trim_end_matches('/').to_owned()),
        Err(_) => Err(ConfigError::Invalid { name, value }),
    }
}
