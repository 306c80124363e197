//! Blocking client for the network's public REST API: account nonce and
//! scam reports, token and NFT details.

use std::time::Duration;

use alloy::primitives::U256;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use rusty_dapp_signing_core::{
    AccountOnNetwork, AccountPort, Address, IdentifierType, NftType, PortError, ScamInfo,
    TokenDetails, TokenDetailsPort,
};

use crate::SigningAdapterConfig;

/// Upper bound on token precision accepted from the API.
const MAX_TOKEN_DECIMALS: u32 = 32;

#[derive(Debug, Clone)]
pub struct HttpNetworkApi {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    address: String,
    #[serde(default)]
    nonce: u64,
    #[serde(default)]
    balance: Option<String>,
    #[serde(default)]
    scam_info: Option<ScamInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(default)]
    decimals: Option<u32>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    assets: Option<TokenAssets>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAssets {
    #[serde(default)]
    svg_url: Option<String>,
    #[serde(default)]
    png_url: Option<String>,
}

impl HttpNetworkApi {
    pub fn with_config(config: &SigningAdapterConfig) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PortError::Transport(format!("network api client init failed: {e}")))?;
        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// `Ok(None)` on 404.
    fn get_json(&self, path: &str) -> Result<Option<Value>, PortError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "network api request");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| PortError::Transport(format!("network api request failed: {e}")))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("network api json decode failed: {e}")))?;
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "network api status {status}: {body}"
            )));
        }
        Ok(Some(body))
    }
}

impl AccountPort for HttpNetworkApi {
    fn account(&self, address: &Address) -> Result<AccountOnNetwork, PortError> {
        let body = self
            .get_json(&format!("/accounts/{address}"))?
            .ok_or_else(|| PortError::NotFound(format!("account {address}")))?;
        let raw: AccountResponse = serde_json::from_value(body)
            .map_err(|e| PortError::Validation(format!("account payload: {e}")))?;
        let parsed: Address = raw
            .address
            .parse()
            .map_err(|e| PortError::Validation(format!("account address: {e}")))?;
        if parsed != *address {
            return Err(PortError::Validation(format!(
                "api returned account {parsed} for {address}"
            )));
        }
        let balance = match raw.balance.as_deref() {
            None | Some("") => U256::ZERO,
            Some(b) => U256::from_str_radix(b, 10)
                .map_err(|e| PortError::Validation(format!("account balance: {e}")))?,
        };
        Ok(AccountOnNetwork {
            address: parsed,
            nonce: raw.nonce,
            balance,
            scam_info: raw.scam_info.filter(|s| !s.info.is_empty()),
        })
    }
}

impl TokenDetailsPort for HttpNetworkApi {
    fn token_details(&self, identifier: &str) -> Result<Option<TokenDetails>, PortError> {
        let path = match IdentifierType::of(identifier) {
            IdentifierType::Esdt => format!("/tokens/{identifier}"),
            IdentifierType::Nft => format!("/nfts/{identifier}"),
            IdentifierType::Native => return Ok(None),
        };
        let Some(body) = self.get_json(&path)? else {
            return Ok(None);
        };
        let raw: TokenResponse = serde_json::from_value(body)
            .map_err(|e| PortError::Validation(format!("token payload: {e}")))?;
        let decimals = raw.decimals.unwrap_or(0);
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(PortError::Validation(format!(
                "token {identifier} reports {decimals} decimals"
            )));
        }
        let avatar = raw
            .assets
            .and_then(|a| a.svg_url.or(a.png_url))
            .filter(|url| !url.is_empty());
        Ok(Some(TokenDetails {
            decimals,
            avatar,
            nft_type: raw.kind.as_deref().and_then(nft_type),
        }))
    }
}

fn nft_type(kind: &str) -> Option<NftType> {
    match kind {
        "NonFungibleESDT" => Some(NftType::NonFungibleESDT),
        "SemiFungibleESDT" => Some(NftType::SemiFungibleESDT),
        "MetaESDT" => Some(NftType::MetaESDT),
        _ => None,
    }
}
