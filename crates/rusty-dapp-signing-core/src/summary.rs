//! Derived view of one transaction in a signing modal: receiver, amount,
//! fee and payload data.

use tracing::warn;

use crate::domain::{Address, NetworkConfig, NftType, ScamInfo, TokenDetails};
use crate::format::{format_amount, format_fee, FormatAmountOptions};
use crate::ports::TokenDetailsPort;
use crate::token_info::{is_token_transfer, ActiveTransaction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataView {
    Plain(String),
    /// Multi-transfer payloads highlight their transfer segment.
    Highlighted {
        before: String,
        highlight: String,
        after: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSummary {
    pub receiver: Address,
    pub receiver_scam: Option<ScamInfo>,
    pub is_token_transfer: bool,
    pub is_nft: bool,
    /// Identifier used for the token-details lookup.
    pub lookup_identifier: String,
    /// Label shown next to the amount.
    pub token_label: String,
    pub token_type_label: String,
    pub decimals: u32,
    pub nft_type: Option<NftType>,
    pub avatar: Option<String>,
    /// `None` for non-fungible units, which carry no meaningful amount.
    pub amount: Option<String>,
    pub fee: String,
    pub data: Option<DataView>,
    pub is_sc_call: bool,
}

impl TransactionSummary {
    pub fn derive<T>(
        active: Option<&ActiveTransaction>,
        network: &NetworkConfig,
        tokens: &T,
    ) -> Option<Self>
    where
        T: TokenDetailsPort + ?Sized,
    {
        let active = active?;
        let info = &active.token_info;
        let tx = &active.transaction;

        let is_token = is_token_transfer(&info.token_id, &network.egld_label);
        let is_nft = info.is_nft();
        let nft_id = info.nft_id();
        let lookup_identifier = if info.nonce().is_some() {
            nft_id.clone()
        } else {
            info.token_id.clone()
        };

        let details = lookup_details(tokens, &lookup_identifier, network);

        let (input, decimals) = if is_token {
            (info.amount.clone(), details.decimals)
        } else {
            (tx.value.to_string(), network.decimals)
        };
        let opts = FormatAmountOptions {
            decimals,
            ..FormatAmountOptions::for_network(network)
        };
        let formatted = format_amount(&input, &opts).unwrap_or_else(|e| {
            warn!(error = %e, "unformattable transaction amount");
            input.clone()
        });
        let shown_amount = if is_nft { info.amount.clone() } else { formatted };
        let amount = match details.nft_type {
            Some(NftType::NonFungibleESDT) => None,
            _ => Some(shown_amount),
        };

        let token_label = if is_nft {
            nft_id
        } else if info.token_id.is_empty() {
            network.egld_label.clone()
        } else {
            info.token_id.clone()
        };

        let fee = format_fee(tx, network).unwrap_or_else(|e| {
            warn!(error = %e, "unformattable transaction fee");
            String::new()
        });

        let data = tx
            .data
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| data_view(d, info.multi_tx_data.as_deref()));

        Some(Self {
            receiver: active.effective_receiver(),
            receiver_scam: active.receiver_scam_info.clone(),
            is_token_transfer: is_token,
            is_nft,
            lookup_identifier,
            token_label,
            token_type_label: details
                .nft_type
                .map(|t| t.as_str().to_owned())
                .unwrap_or_else(|| network.egld_label.clone()),
            decimals: details.decimals,
            nft_type: details.nft_type,
            avatar: details.avatar,
            amount,
            fee,
            data,
            is_sc_call: info.token_id.is_empty(),
        })
    }
}

fn lookup_details<T>(tokens: &T, identifier: &str, network: &NetworkConfig) -> TokenDetails
where
    T: TokenDetailsPort + ?Sized,
{
    let fallback = TokenDetails {
        decimals: network.decimals,
        avatar: None,
        nft_type: None,
    };
    if identifier.is_empty() || identifier == network.egld_label {
        return fallback;
    }
    match tokens.token_details(identifier) {
        Ok(Some(details)) => details,
        Ok(None) => fallback,
        Err(e) => {
            warn!(identifier, error = %e, "token details lookup failed");
            fallback
        }
    }
}

fn data_view(data: &str, highlight: Option<&str>) -> DataView {
    match highlight.filter(|h| !h.is_empty()) {
        Some(h) => match data.find(h) {
            Some(start) => DataView::Highlighted {
                before: data[..start].to_owned(),
                highlight: h.to_owned(),
                after: data[start + h.len()..].to_owned(),
            },
            None => DataView::Plain(data.to_owned()),
        },
        None => DataView::Plain(data.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use alloy::primitives::{hex, U256};

    use super::*;
    use crate::domain::{ChainId, Transaction};
    use crate::ports::PortError;

    #[derive(Default)]
    struct Tokens {
        details: Option<TokenDetails>,
        asked: RefCell<Vec<String>>,
    }

    impl TokenDetailsPort for Tokens {
        fn token_details(&self, identifier: &str) -> Result<Option<TokenDetails>, PortError> {
            self.asked.borrow_mut().push(identifier.to_owned());
            Ok(self.details.clone())
        }
    }

    fn tx(value: u128, data: Option<String>) -> Transaction {
        Transaction {
            nonce: 1,
            value: U256::from(value),
            receiver: Address([2u8; 32]),
            sender: Address([1u8; 32]),
            gas_price: 1_000_000_000,
            gas_limit: 50_000,
            data,
            chain_id: ChainId::new("D"),
            version: 1,
            signature: None,
        }
    }

    #[test]
    fn null_transaction_renders_nothing() {
        let summary = TransactionSummary::derive(None, &NetworkConfig::devnet(), &Tokens::default());
        assert!(summary.is_none());
    }

    #[test]
    fn native_transfer_uses_network_decimals_and_skips_lookup() {
        let tokens = Tokens::default();
        let active = ActiveTransaction::new(tx(2_500_000_000_000_000_000, None), None);
        let summary = TransactionSummary::derive(Some(&active), &NetworkConfig::devnet(), &tokens)
            .expect("summary");
        assert!(!summary.is_token_transfer);
        assert_eq!(summary.amount.as_deref(), Some("2.5000"));
        assert_eq!(summary.token_label, "xEGLD");
        assert_eq!(summary.fee, "0.00005");
        assert!(summary.data.is_none());
        assert!(tokens.asked.borrow().is_empty());
    }

    #[test]
    fn token_transfer_uses_token_decimals() {
        let tokens = Tokens {
            details: Some(TokenDetails {
                decimals: 6,
                avatar: Some("https://media/usdc.svg".to_owned()),
                nft_type: None,
            }),
            ..Tokens::default()
        };
        let data = format!("ESDTTransfer@{}@0f4240", hex::encode("USDC-c76f1f"));
        let active = ActiveTransaction::new(tx(0, Some(data.clone())), None);
        let summary = TransactionSummary::derive(Some(&active), &NetworkConfig::devnet(), &tokens)
            .expect("summary");
        assert!(summary.is_token_transfer);
        assert_eq!(summary.amount.as_deref(), Some("1.0000"));
        assert_eq!(summary.token_label, "USDC-c76f1f");
        assert_eq!(summary.data, Some(DataView::Plain(data)));
        assert!(!summary.is_sc_call);
        assert_eq!(tokens.asked.borrow().as_slice(), ["USDC-c76f1f".to_owned()]);
    }

    #[test]
    fn non_fungible_unit_hides_amount_and_looks_up_nft_id() {
        let tokens = Tokens {
            details: Some(TokenDetails {
                decimals: 0,
                avatar: None,
                nft_type: Some(NftType::NonFungibleESDT),
            }),
            ..Tokens::default()
        };
        let dest = Address([9u8; 32]);
        let data = format!(
            "ESDTNFTTransfer@{}@0a@01@{}",
            hex::encode("NFT-abcdef"),
            dest.to_hex()
        );
        let scam = ScamInfo {
            info: "reported phishing".to_owned(),
            kind: Some("scam".to_owned()),
        };
        let active = ActiveTransaction::new(tx(0, Some(data)), Some(scam.clone()));
        let summary = TransactionSummary::derive(Some(&active), &NetworkConfig::devnet(), &tokens)
            .expect("summary");
        assert!(summary.is_nft);
        assert_eq!(summary.lookup_identifier, "NFT-abcdef-0a");
        assert_eq!(summary.token_label, "NFT-abcdef-0a");
        assert!(summary.amount.is_none());
        assert_eq!(summary.receiver, dest);
        assert_eq!(summary.receiver_scam, Some(scam));
        assert_eq!(summary.token_type_label, "NonFungibleESDT");
    }

    #[test]
    fn multi_transfer_data_is_highlighted() {
        let dest = Address([4u8; 32]);
        let data = format!("MultiESDTNFTTransfer@{}@02", dest.to_hex());
        let active = ActiveTransaction::new(tx(0, Some(data.clone())), None);
        let summary =
            TransactionSummary::derive(Some(&active), &NetworkConfig::devnet(), &Tokens::default())
                .expect("summary");
        assert_eq!(
            summary.data,
            Some(DataView::Highlighted {
                before: String::new(),
                highlight: data,
                after: String::new(),
            })
        );
        assert_eq!(summary.receiver, dest);
    }
}
