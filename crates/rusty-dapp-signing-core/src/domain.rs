use std::fmt;
use std::str::FromStr;

use alloy::primitives::{hex, U256};
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Human-readable part of every account address.
pub const ADDRESS_HRP: &str = "erd";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid bech32 address: {0}")]
    Bech32(String),
    #[error("unexpected address prefix: {0}")]
    Prefix(String),
    #[error("invalid hex address: {0}")]
    Hex(String),
    #[error("address must be 32 bytes, got {0}")]
    Length(usize),
}

/// Account public key, displayed as `erd1...` bech32.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn from_bech32(value: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(value.trim()).map_err(|e| AddressError::Bech32(e.to_string()))?;
        if hrp.to_lowercase() != ADDRESS_HRP {
            return Err(AddressError::Prefix(hrp.to_lowercase()));
        }
        Self::from_slice(&data)
    }

    pub fn from_hex(value: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(value.trim()).map_err(|e| AddressError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AddressError::Length(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn bech32(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hrp = Hrp::parse_unchecked(ADDRESS_HRP);
        let encoded = bech32::encode::<Bech32>(hrp, &self.0).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::from_hex(s);
        }
        Self::from_bech32(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub nonce: u64,
    pub value: U256,
    pub receiver: Address,
    pub sender: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Option<String>,
    #[serde(rename = "chainID")]
    pub chain_id: ChainId,
    pub version: u32,
    pub signature: Option<String>,
}

impl Transaction {
    pub fn data_len(&self) -> usize {
        self.data.as_deref().map(str::len).unwrap_or(0)
    }

    /// Transaction with the signature field cleared, as handed to signers.
    pub fn unsigned(&self) -> Self {
        Self {
            signature: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchStatus {
    Pending,
    Signed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBatch {
    pub session_id: String,
    pub transactions: Vec<Transaction>,
    pub callback_route: String,
    pub status: BatchStatus,
}

/// Outcome of a batch, kept after the pending batch leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBatch {
    pub status: BatchStatus,
    pub transactions: Option<Vec<Transaction>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Wallet,
    Extension,
    Ledger,
    WalletConnect,
}

impl ProviderType {
    pub const ALL: [ProviderType; 4] = [
        ProviderType::Wallet,
        ProviderType::Extension,
        ProviderType::Ledger,
        ProviderType::WalletConnect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Wallet => "wallet",
            ProviderType::Extension => "extension",
            ProviderType::Ledger => "ledger",
            ProviderType::WalletConnect => "walletconnect",
        }
    }

    /// Ledger devices confirm one transaction per screen.
    pub fn signs_one_by_one(&self) -> bool {
        matches!(self, ProviderType::Ledger)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScamInfo {
    pub info: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOnNetwork {
    pub address: Address,
    pub nonce: u64,
    pub balance: U256,
    pub scam_info: Option<ScamInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NftType {
    NonFungibleESDT,
    SemiFungibleESDT,
    MetaESDT,
}

impl NftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NftType::NonFungibleESDT => "NonFungibleESDT",
            NftType::SemiFungibleESDT => "SemiFungibleESDT",
            NftType::MetaESDT => "MetaESDT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub decimals: u32,
    pub avatar: Option<String>,
    pub nft_type: Option<NftType>,
}

/// Display and fee settings of the active network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub id: String,
    pub chain_id: ChainId,
    pub egld_label: String,
    pub decimals: u32,
    pub digits: u32,
    pub api_address: String,
    pub wallet_address: String,
    pub min_gas_limit: u64,
    pub gas_per_data_byte: u64,
    pub gas_price_modifier_numerator: u64,
    pub gas_price_modifier_denominator: u64,
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        Self {
            id: "mainnet".to_owned(),
            chain_id: ChainId::new("1"),
            egld_label: "EGLD".to_owned(),
            decimals: 18,
            digits: 4,
            api_address: "https://api.multiversx.com".to_owned(),
            wallet_address: "https://wallet.multiversx.com".to_owned(),
            min_gas_limit: 50_000,
            gas_per_data_byte: 1_500,
            gas_price_modifier_numerator: 1,
            gas_price_modifier_denominator: 100,
        }
    }

    pub fn testnet() -> Self {
        Self {
            id: "testnet".to_owned(),
            chain_id: ChainId::new("T"),
            egld_label: "xEGLD".to_owned(),
            api_address: "https://testnet-api.multiversx.com".to_owned(),
            wallet_address: "https://testnet-wallet.multiversx.com".to_owned(),
            ..Self::mainnet()
        }
    }

    pub fn devnet() -> Self {
        Self {
            id: "devnet".to_owned(),
            chain_id: ChainId::new("D"),
            egld_label: "xEGLD".to_owned(),
            api_address: "https://devnet-api.multiversx.com".to_owned(),
            wallet_address: "https://devnet-wallet.multiversx.com".to_owned(),
            ..Self::mainnet()
        }
    }

    pub fn by_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::mainnet()),
            "testnet" => Some(Self::testnet()),
            "devnet" => Some(Self::devnet()),
            _ => None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::devnet()
    }
}
