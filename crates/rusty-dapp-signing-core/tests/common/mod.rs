#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::U256;

use rusty_dapp_signing_core::{
    AccountOnNetwork, AccountPort, Address, ChainId, ClockPort, DappStore, NetworkConfig,
    PortError, ProviderType, ScamInfo, SignOptions, SignOutcome, SigningProvider, StoreAction,
    TokenDetails, TokenDetailsPort, Transaction,
};

#[derive(Debug, Default)]
pub struct FakeApi {
    pub chain_nonce: u64,
    pub fail_with: Option<String>,
    pub scams: HashMap<Address, ScamInfo>,
    pub tokens: HashMap<String, TokenDetails>,
    pub account_calls: Mutex<Vec<Address>>,
}

impl FakeApi {
    pub fn with_nonce(chain_nonce: u64) -> Self {
        Self {
            chain_nonce,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_owned()),
            ..Self::default()
        }
    }
}

impl AccountPort for FakeApi {
    fn account(&self, address: &Address) -> Result<AccountOnNetwork, PortError> {
        self.account_calls
            .lock()
            .map_err(|e| PortError::Transport(e.to_string()))?
            .push(*address);
        if let Some(msg) = &self.fail_with {
            return Err(PortError::Transport(msg.clone()));
        }
        Ok(AccountOnNetwork {
            address: *address,
            nonce: self.chain_nonce,
            balance: U256::ZERO,
            scam_info: self.scams.get(address).cloned(),
        })
    }
}

impl TokenDetailsPort for FakeApi {
    fn token_details(&self, identifier: &str) -> Result<Option<TokenDetails>, PortError> {
        Ok(self.tokens.get(identifier).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct SignCall {
    pub transactions: Vec<Transaction>,
    pub options: SignOptions,
}

#[derive(Debug)]
pub struct RecordingProvider {
    pub kind: ProviderType,
    pub reject: bool,
    pub calls: Mutex<Vec<SignCall>>,
}

impl RecordingProvider {
    pub fn new(kind: ProviderType) -> Arc<Self> {
        Arc::new(Self {
            kind,
            reject: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting(kind: ProviderType) -> Arc<Self> {
        Arc::new(Self {
            kind,
            reject: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<SignCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl SigningProvider for RecordingProvider {
    fn provider_type(&self) -> ProviderType {
        self.kind
    }

    fn sign_transactions(
        &self,
        transactions: &[Transaction],
        options: &SignOptions,
    ) -> Result<SignOutcome, PortError> {
        self.calls
            .lock()
            .map_err(|e| PortError::Transport(e.to_string()))?
            .push(SignCall {
                transactions: transactions.to_vec(),
                options: options.clone(),
            });
        if self.reject {
            return Err(PortError::Rejected("user denied on device".to_owned()));
        }
        if self.kind == ProviderType::Wallet {
            let callback = options.callback_url.clone().unwrap_or_default();
            return Ok(SignOutcome::Redirected {
                url: format!("https://wallet.test/hook/sign?callbackUrl={callback}"),
            });
        }
        Ok(SignOutcome::Signed(
            transactions
                .iter()
                .map(|tx| Transaction {
                    signature: Some(format!("sig-{}", tx.nonce)),
                    ..tx.clone()
                })
                .collect(),
        ))
    }
}

#[derive(Debug)]
pub struct FixedClock(pub AtomicU64);

impl FixedClock {
    pub fn at(ms: u64) -> Self {
        Self(AtomicU64::new(ms))
    }
}

impl ClockPort for FixedClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.0.fetch_add(1, Ordering::SeqCst))
    }
}

pub fn sender() -> Address {
    Address([1u8; 32])
}

pub fn receiver() -> Address {
    Address([2u8; 32])
}

pub fn transfer(chain: &str, value: u64) -> Transaction {
    Transaction {
        nonce: 0,
        value: U256::from(value),
        receiver: receiver(),
        sender: sender(),
        gas_price: 1_000_000_000,
        gas_limit: 50_000,
        data: None,
        chain_id: ChainId::new(chain),
        version: 1,
        signature: None,
    }
}

pub fn logged_in_store(provider: Arc<dyn SigningProvider>, local_nonce: u64) -> DappStore {
    let mut store = DappStore::new(NetworkConfig::devnet());
    store.dispatch(StoreAction::Login {
        provider,
        address: sender(),
    });
    store.dispatch(StoreAction::SetAccountNonce(local_nonce));
    store
}
