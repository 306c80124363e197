//! Token-transfer metadata derived from a transaction's data payload.

use alloy::primitives::{hex, U256};

use crate::domain::{Address, ScamInfo, Transaction};

const ESDT_TRANSFER: &str = "ESDTTransfer";
const ESDT_NFT_TRANSFER: &str = "ESDTNFTTransfer";
const MULTI_ESDT_NFT_TRANSFER: &str = "MultiESDTNFTTransfer";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionTokenInfo {
    /// Empty for native transfers.
    pub token_id: String,
    /// Hex nonce of an NFT/SFT unit.
    pub nonce: Option<String>,
    /// Smallest-unit amount as a decimal string.
    pub amount: String,
    /// Destination carried inside the payload, when it differs from the tx receiver.
    pub receiver: Option<Address>,
    pub multi_tx_data: Option<String>,
}

impl TransactionTokenInfo {
    pub fn from_transaction(tx: &Transaction) -> Self {
        let Some(data) = tx.data.as_deref().filter(|d| !d.is_empty()) else {
            return Self::native(tx);
        };
        let parts: Vec<&str> = data.split('@').collect();
        let parsed = match parts.as_slice() {
            [ESDT_TRANSFER, token, amount, ..] => decode_utf8(token).map(|token_id| Self {
                token_id,
                nonce: None,
                amount: decode_amount(amount),
                receiver: None,
                multi_tx_data: None,
            }),
            [ESDT_NFT_TRANSFER, collection, nonce, amount, receiver, ..] => {
                decode_utf8(collection).map(|token_id| Self {
                    token_id,
                    nonce: Some((*nonce).to_owned()).filter(|n| !n.is_empty()),
                    amount: decode_amount(amount),
                    receiver: Address::from_hex(receiver).ok(),
                    multi_tx_data: None,
                })
            }
            [MULTI_ESDT_NFT_TRANSFER, receiver, ..] => Some(Self {
                token_id: String::new(),
                nonce: None,
                amount: String::new(),
                receiver: Address::from_hex(receiver).ok(),
                multi_tx_data: Some(data.to_owned()),
            }),
            _ => None,
        };
        parsed.unwrap_or_else(|| Self::native(tx))
    }

    fn native(tx: &Transaction) -> Self {
        Self {
            amount: tx.value.to_string(),
            ..Self::default()
        }
    }

    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref().filter(|n| !n.is_empty())
    }

    /// `{tokenId}-{nonce}` when a nonce is present, otherwise the token id.
    pub fn nft_id(&self) -> String {
        nft_identifier(&self.token_id, self.nonce())
    }

    pub fn is_nft(&self) -> bool {
        !self.token_id.is_empty() && self.nonce().is_some()
    }
}

pub fn nft_identifier(token_id: &str, nonce: Option<&str>) -> String {
    match nonce.filter(|n| !n.is_empty()) {
        Some(nonce) => format!("{token_id}-{nonce}"),
        None => token_id.to_owned(),
    }
}

pub fn is_token_transfer(token_id: &str, egld_label: &str) -> bool {
    !token_id.is_empty() && token_id != egld_label
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierType {
    Native,
    Esdt,
    Nft,
}

impl IdentifierType {
    /// `TICKER-abcdef` is a fungible token; `TICKER-abcdef-0a` one NFT/SFT unit.
    pub fn of(identifier: &str) -> Self {
        let parts: Vec<&str> = identifier.split('-').collect();
        match parts.as_slice() {
            [ticker, random] if is_ticker(ticker) && is_hex(random) => IdentifierType::Esdt,
            [ticker, random, nonce] if is_ticker(ticker) && is_hex(random) && is_hex(nonce) => {
                IdentifierType::Nft
            }
            _ => IdentifierType::Native,
        }
    }
}

fn is_ticker(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn decode_utf8(hex_str: &str) -> Option<String> {
    let bytes = hex::decode(hex_str).ok()?;
    String::from_utf8(bytes).ok().filter(|s| !s.is_empty())
}

fn decode_amount(hex_str: &str) -> String {
    if hex_str.is_empty() {
        return "0".to_owned();
    }
    U256::from_str_radix(hex_str, 16)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "0".to_owned())
}

/// One transaction as shown in a signing modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTransaction {
    pub transaction: Transaction,
    pub token_info: TransactionTokenInfo,
    pub receiver_scam_info: Option<ScamInfo>,
}

impl ActiveTransaction {
    pub fn new(transaction: Transaction, receiver_scam_info: Option<ScamInfo>) -> Self {
        let token_info = TransactionTokenInfo::from_transaction(&transaction);
        Self {
            transaction,
            token_info,
            receiver_scam_info,
        }
    }

    /// Destination the funds actually reach.
    pub fn effective_receiver(&self) -> Address {
        self.token_info
            .receiver
            .unwrap_or(self.transaction.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChainId;

    fn tx_with_data(data: Option<&str>) -> Transaction {
        Transaction {
            nonce: 0,
            value: U256::from(5u64),
            receiver: Address([2u8; 32]),
            sender: Address([1u8; 32]),
            gas_price: 1_000_000_000,
            gas_limit: 500_000,
            data: data.map(str::to_owned),
            chain_id: ChainId::new("D"),
            version: 1,
            signature: None,
        }
    }

    #[test]
    fn native_transfer_uses_tx_value() {
        let info = TransactionTokenInfo::from_transaction(&tx_with_data(None));
        assert_eq!(info.token_id, "");
        assert_eq!(info.amount, "5");
        assert!(!info.is_nft());
    }

    #[test]
    fn esdt_transfer_decodes_token_and_amount() {
        let data = format!("ESDTTransfer@{}@0de0b6b3a7640000", hex::encode("USDC-c76f1f"));
        let info = TransactionTokenInfo::from_transaction(&tx_with_data(Some(&data)));
        assert_eq!(info.token_id, "USDC-c76f1f");
        assert_eq!(info.amount, "1000000000000000000");
        assert_eq!(info.nft_id(), "USDC-c76f1f");
    }

    #[test]
    fn nft_transfer_composes_identifier_and_receiver() {
        let dest = Address([9u8; 32]);
        let data = format!(
            "ESDTNFTTransfer@{}@0a@01@{}",
            hex::encode("NFT-abcdef"),
            dest.to_hex()
        );
        let active = ActiveTransaction::new(tx_with_data(Some(&data)), None);
        assert!(active.token_info.is_nft());
        assert_eq!(active.token_info.nft_id(), "NFT-abcdef-0a");
        assert_eq!(active.token_info.amount, "1");
        assert_eq!(active.effective_receiver(), dest);
    }

    #[test]
    fn unknown_payload_falls_back_to_native() {
        let info = TransactionTokenInfo::from_transaction(&tx_with_data(Some("claim@01")));
        assert_eq!(info.token_id, "");
        assert_eq!(info.amount, "5");
    }

    #[test]
    fn identifier_composition_ignores_empty_nonce() {
        assert_eq!(nft_identifier("TOKEN-1hfr", Some("123")), "TOKEN-1hfr-123");
        assert_eq!(nft_identifier("TOKEN-1hfr", Some("")), "TOKEN-1hfr");
        assert_eq!(nft_identifier("TOKEN-1hfr", None), "TOKEN-1hfr");
    }

    #[test]
    fn identifier_types() {
        assert_eq!(IdentifierType::of("EGLD"), IdentifierType::Native);
        assert_eq!(IdentifierType::of("USDC-c76f1f"), IdentifierType::Esdt);
        assert_eq!(IdentifierType::of("NFT-abcdef-0a"), IdentifierType::Nft);
        assert!(is_token_transfer("USDC-c76f1f", "EGLD"));
        assert!(!is_token_transfer("EGLD", "EGLD"));
        assert!(!is_token_transfer("", "EGLD"));
    }
}
