//! Application-wide dapp state. Every mutation goes through
//! [`DappStore::dispatch`], which returns and publishes the resulting events.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::callback::{apply_signatures, WalletCallback, WalletCallbackOutcome};
use crate::domain::{
    Address, BatchStatus, ChainId, NetworkConfig, ProviderType, SignedBatch, Transaction,
    TransactionBatch,
};
use crate::ports::{ClockPort, PortError, SigningProvider};

pub enum StoreAction {
    Login {
        provider: Arc<dyn SigningProvider>,
        address: Address,
    },
    Logout,
    SetNetwork(NetworkConfig),
    SetAccountNonce(u64),
    EnqueueBatch(TransactionBatch),
    /// Replaces the pending batch's transactions, e.g. after nonce assignment.
    UpdatePendingTransactions {
        session_id: String,
        transactions: Vec<Transaction>,
    },
    ClearPendingBatch,
    UpdateBatchStatus {
        session_id: String,
        status: BatchStatus,
        transactions: Option<Vec<Transaction>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    LoggedIn { provider_type: ProviderType },
    LoggedOut,
    NetworkChanged { chain_id: ChainId },
    AccountNonceChanged(u64),
    BatchQueued { session_id: String },
    PendingBatchUpdated { session_id: String },
    PendingBatchCleared { session_id: Option<String> },
    BatchStatusChanged { session_id: String, status: BatchStatus },
}

#[derive(Default)]
pub struct DappStore {
    provider: Option<Arc<dyn SigningProvider>>,
    network: NetworkConfig,
    address: Option<Address>,
    account_nonce: u64,
    transactions_to_sign: Option<TransactionBatch>,
    signed_transactions: HashMap<String, SignedBatch>,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl fmt::Debug for DappStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DappStore")
            .field("provider", &self.provider_type())
            .field("network", &self.network.id)
            .field("address", &self.address)
            .field("account_nonce", &self.account_nonce)
            .field("transactions_to_sign", &self.transactions_to_sign)
            .field("signed_transactions", &self.signed_transactions.len())
            .finish()
    }
}

impl DappStore {
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn provider(&self) -> Option<Arc<dyn SigningProvider>> {
        self.provider.clone()
    }

    pub fn provider_type(&self) -> Option<ProviderType> {
        self.provider.as_ref().map(|p| p.provider_type())
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.network.chain_id
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn account_nonce(&self) -> u64 {
        self.account_nonce
    }

    pub fn transactions_to_sign(&self) -> Option<&TransactionBatch> {
        self.transactions_to_sign.as_ref()
    }

    pub fn signed_batch(&self, session_id: &str) -> Option<&SignedBatch> {
        self.signed_transactions.get(session_id)
    }

    pub fn batch_status(&self, session_id: &str) -> Option<BatchStatus> {
        self.signed_batch(session_id).map(|b| b.status).or_else(|| {
            self.transactions_to_sign
                .as_ref()
                .filter(|b| b.session_id == session_id)
                .map(|b| b.status)
        })
    }

    pub fn dispatch(&mut self, action: StoreAction) -> Vec<StoreEvent> {
        let events = self.reduce(action);
        self.publish(&events);
        events
    }

    /// Queues a new pending batch under a clock-derived session id.
    pub fn send_transactions<C>(
        &mut self,
        clock: &C,
        transactions: Vec<Transaction>,
        callback_route: impl Into<String>,
    ) -> Result<String, PortError>
    where
        C: ClockPort + ?Sized,
    {
        let session_id = clock.now_ms()?.to_string();
        self.dispatch(StoreAction::EnqueueBatch(TransactionBatch {
            session_id: session_id.clone(),
            transactions,
            callback_route: callback_route.into(),
            status: BatchStatus::Pending,
        }));
        Ok(session_id)
    }

    /// Applies the result a web wallet reported through its redirect.
    /// Callbacks for sessions this store never queued are ignored, and only a
    /// callback for the pending session clears it.
    pub fn apply_wallet_callback(&mut self, callback: WalletCallback) -> Vec<StoreEvent> {
        let is_pending = self
            .transactions_to_sign
            .as_ref()
            .is_some_and(|b| b.session_id == callback.session_id);
        let known = if is_pending {
            self.transactions_to_sign.as_ref().map(|b| b.transactions.clone())
        } else {
            self.signed_transactions
                .get(&callback.session_id)
                .map(|b| b.transactions.clone().unwrap_or_default())
        };
        let Some(known) = known else {
            warn!(session_id = %callback.session_id, "ignoring callback for unknown session");
            return Vec::new();
        };

        let (status, transactions) = match callback.outcome {
            WalletCallbackOutcome::Signed { signatures, nonces } => (
                BatchStatus::Signed,
                Some(apply_signatures(&known, &signatures, &nonces)),
            ),
            WalletCallbackOutcome::Cancelled => (BatchStatus::Cancelled, None),
        };
        let mut events = self.dispatch(StoreAction::UpdateBatchStatus {
            session_id: callback.session_id,
            status,
            transactions,
        });
        if is_pending {
            events.extend(self.dispatch(StoreAction::ClearPendingBatch));
        }
        events
    }

    fn reduce(&mut self, action: StoreAction) -> Vec<StoreEvent> {
        match action {
            StoreAction::Login { provider, address } => {
                let provider_type = provider.provider_type();
                info!(%provider_type, %address, "provider logged in");
                self.provider = Some(provider);
                self.address = Some(address);
                vec![StoreEvent::LoggedIn { provider_type }]
            }
            StoreAction::Logout => {
                self.provider = None;
                self.address = None;
                self.account_nonce = 0;
                vec![StoreEvent::LoggedOut]
            }
            StoreAction::SetNetwork(network) => {
                let chain_id = network.chain_id.clone();
                self.network = network;
                vec![StoreEvent::NetworkChanged { chain_id }]
            }
            StoreAction::SetAccountNonce(nonce) => {
                self.account_nonce = nonce;
                vec![StoreEvent::AccountNonceChanged(nonce)]
            }
            StoreAction::EnqueueBatch(batch) => {
                debug!(
                    session_id = %batch.session_id,
                    count = batch.transactions.len(),
                    "batch queued for signing"
                );
                let session_id = batch.session_id.clone();
                self.transactions_to_sign = Some(batch);
                vec![StoreEvent::BatchQueued { session_id }]
            }
            StoreAction::UpdatePendingTransactions {
                session_id,
                transactions,
            } => match self.transactions_to_sign.as_mut() {
                Some(batch) if batch.session_id == session_id => {
                    batch.transactions = transactions;
                    vec![StoreEvent::PendingBatchUpdated { session_id }]
                }
                _ => Vec::new(),
            },
            StoreAction::ClearPendingBatch => {
                let cleared = self.transactions_to_sign.take();
                vec![StoreEvent::PendingBatchCleared {
                    session_id: cleared.map(|b| b.session_id),
                }]
            }
            StoreAction::UpdateBatchStatus {
                session_id,
                status,
                transactions,
            } => self.update_batch_status(session_id, status, transactions),
        }
    }

    fn update_batch_status(
        &mut self,
        session_id: String,
        status: BatchStatus,
        transactions: Option<Vec<Transaction>>,
    ) -> Vec<StoreEvent> {
        if let Some(batch) = self
            .transactions_to_sign
            .as_mut()
            .filter(|b| b.session_id == session_id)
        {
            batch.status = status;
        }

        let entry = self
            .signed_transactions
            .entry(session_id.clone())
            .or_insert(SignedBatch {
                status,
                transactions: None,
            });
        entry.status = status;
        if transactions.is_some() {
            entry.transactions = transactions;
        }

        let mut events = vec![StoreEvent::BatchStatusChanged { session_id, status }];
        if status == BatchStatus::Signed {
            let last_signed = entry
                .transactions
                .as_ref()
                .and_then(|txs| txs.iter().map(|tx| tx.nonce).max());
            if let Some(last) = last_signed {
                let next = last.saturating_add(1);
                if next > self.account_nonce {
                    self.account_nonce = next;
                    events.push(StoreEvent::AccountNonceChanged(next));
                }
            }
        }
        events
    }

    fn publish(&mut self, events: &[StoreEvent]) {
        if events.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| events.iter().all(|ev| tx.send(ev.clone()).is_ok()));
    }
}
