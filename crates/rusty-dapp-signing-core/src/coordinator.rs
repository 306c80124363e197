//! Routes pending transaction batches from the store to the logged-in
//! signing provider.
//!
//! Handling a batch runs in three phases so that no store borrow is held
//! across network calls:
//!
//! 1. [`SigningCoordinator::begin`] snapshots the pending batch, checks the
//!    signer and chain IDs, and returns a [`SigningJob`].
//! 2. [`SigningJob::run`] fetches the account nonce, assigns nonces and
//!    dispatches to the provider. It only touches the network ports.
//! 3. [`SigningCoordinator::finish`] applies the [`JobOutcome`] back to the
//!    store and the modal state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::batch::{assign_nonces, next_nonce, validate_chain_ids};
use crate::callback::wallet_callback_url;
use crate::domain::{
    Address, BatchStatus, NetworkConfig, ProviderType, ScamInfo, Transaction,
};
use crate::error::SigningError;
use crate::ports::{AccountPort, SignOptions, SignOutcome, SigningProvider, TokenDetailsPort};
use crate::state_machine::{
    coordinator_transition, CoordinatorAction, CoordinatorState, StateTransition,
};
use crate::steps::{SignSteps, StepOutcome};
use crate::store::{DappStore, StoreAction, StoreEvent};
use crate::summary::TransactionSummary;
use crate::token_info::ActiveTransaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainMismatchPolicy {
    /// Surface the warning and keep going with nonce assignment.
    Warn,
    /// Surface the warning and cancel the batch.
    #[default]
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Scheme + host the web wallet redirects back to.
    pub origin: String,
    pub chain_mismatch: ChainMismatchPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_owned(),
            chain_mismatch: ChainMismatchPolicy::default(),
        }
    }
}

/// Props shared by every provider-specific signing modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignProps {
    pub error: Option<String>,
    pub session_id: String,
    pub provider_type: Option<ProviderType>,
    pub callback_route: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Web wallet took over through a browser redirect.
    Redirected {
        transactions: Vec<Transaction>,
        url: String,
    },
    Signed(Vec<Transaction>),
    /// The provider's modal flow signs the batch.
    AwaitingProvider {
        provider_type: ProviderType,
        transactions: Vec<Transaction>,
        summaries: Vec<TransactionSummary>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub session_id: String,
    pub result: Result<Dispatched, SigningError>,
}

pub struct SigningJob {
    session_id: String,
    callback_route: String,
    transactions: Vec<Transaction>,
    address: Option<Address>,
    local_nonce: u64,
    provider: Arc<dyn SigningProvider>,
    network: NetworkConfig,
    origin: String,
}

impl fmt::Debug for SigningJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningJob")
            .field("session_id", &self.session_id)
            .field("transactions", &self.transactions.len())
            .field("provider_type", &self.provider.provider_type())
            .finish()
    }
}

impl SigningJob {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn run<A>(self, api: &A) -> JobOutcome
    where
        A: AccountPort + TokenDetailsPort + ?Sized,
    {
        let session_id = self.session_id.clone();
        let result = self.execute(api);
        JobOutcome { session_id, result }
    }

    fn execute<A>(self, api: &A) -> Result<Dispatched, SigningError>
    where
        A: AccountPort + TokenDetailsPort + ?Sized,
    {
        let address = self.address.ok_or(SigningError::MissingAddress)?;
        let account = api.account(&address)?;
        let start = next_nonce(account.nonce, self.local_nonce);
        let mut transactions = self.transactions;
        assign_nonces(&mut transactions, start)?;
        debug!(
            session_id = %self.session_id,
            chain_nonce = account.nonce,
            local_nonce = self.local_nonce,
            start,
            "assigned batch nonces"
        );

        match self.provider.provider_type() {
            ProviderType::Wallet => {
                let callback_url =
                    wallet_callback_url(&self.origin, &self.callback_route, &self.session_id)?;
                let options = SignOptions {
                    callback_url: Some(callback_url),
                };
                match self.provider.sign_transactions(&transactions, &options)? {
                    SignOutcome::Redirected { url } => Ok(Dispatched::Redirected { transactions, url }),
                    SignOutcome::Signed(signed) => Ok(Dispatched::Signed(signed)),
                }
            }
            provider_type @ (ProviderType::Extension
            | ProviderType::Ledger
            | ProviderType::WalletConnect) => {
                let summaries = summarize(&transactions, api, &self.network);
                Ok(Dispatched::AwaitingProvider {
                    provider_type,
                    transactions,
                    summaries,
                })
            }
        }
    }
}

fn summarize<A>(transactions: &[Transaction], api: &A, network: &NetworkConfig) -> Vec<TransactionSummary>
where
    A: AccountPort + TokenDetailsPort + ?Sized,
{
    let mut scam_cache: HashMap<Address, Option<ScamInfo>> = HashMap::new();
    transactions
        .iter()
        .filter_map(|tx| {
            let mut active = ActiveTransaction::new(tx.clone(), None);
            let receiver = active.effective_receiver();
            active.receiver_scam_info = scam_cache
                .entry(receiver)
                .or_insert_with(|| match api.account(&receiver) {
                    Ok(account) => account.scam_info,
                    Err(e) => {
                        debug!(%receiver, error = %e, "receiver lookup failed");
                        None
                    }
                })
                .clone();
            TransactionSummary::derive(Some(&active), network, api)
        })
        .collect()
}

#[derive(Debug)]
pub struct SigningCoordinator {
    config: CoordinatorConfig,
    state: CoordinatorState,
    last_transition: Option<StateTransition>,
    show_sign_modal: bool,
    callback_route: String,
    session_id: String,
    error: Option<String>,
    provider_type: Option<ProviderType>,
    in_flight: Option<String>,
    steps: Option<SignSteps>,
    summaries: Vec<TransactionSummary>,
    last_redirect: Option<String>,
}

impl Default for SigningCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl SigningCoordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            state: CoordinatorState::Idle,
            last_transition: None,
            show_sign_modal: false,
            callback_route: String::new(),
            session_id: String::new(),
            error: None,
            provider_type: None,
            in_flight: None,
            steps: None,
            summaries: Vec::new(),
            last_redirect: None,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn last_transition(&self) -> Option<&StateTransition> {
        self.last_transition.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn callback_route(&self) -> &str {
        &self.callback_route
    }

    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    pub fn steps(&self) -> Option<&SignSteps> {
        self.steps.as_ref()
    }

    pub fn summaries(&self) -> &[TransactionSummary] {
        &self.summaries
    }

    /// Summaries for the transactions on the current confirmation screen.
    pub fn current_summaries(&self) -> &[TransactionSummary] {
        match self.steps.as_ref() {
            Some(steps) => {
                let range = steps.current_range();
                self.summaries.get(range).unwrap_or(&[])
            }
            None => &[],
        }
    }

    pub fn last_redirect(&self) -> Option<&str> {
        self.last_redirect.as_deref()
    }

    /// The modal shows only while its batch is still pending.
    pub fn modal_visible(&self, store: &DappStore) -> bool {
        self.show_sign_modal && store.transactions_to_sign().is_some()
    }

    pub fn sign_props(&self) -> SignProps {
        SignProps {
            error: self.error.clone(),
            session_id: self.session_id.clone(),
            provider_type: self.provider_type,
            callback_route: self.callback_route.clone(),
        }
    }

    /// Reacts to a store event; returns the job to run when a new batch arrived.
    pub fn on_event(&mut self, store: &mut DappStore, event: &StoreEvent) -> Option<SigningJob> {
        match event {
            StoreEvent::BatchQueued { session_id } if !session_id.is_empty() => {
                if self.in_flight.as_deref() == Some(session_id.as_str()) {
                    debug!(%session_id, "batch already being handled");
                    return None;
                }
                self.begin(store)
            }
            StoreEvent::PendingBatchCleared { session_id } => {
                if session_id.is_some() && session_id.as_deref() == self.in_flight.as_deref() {
                    self.in_flight = None;
                }
                None
            }
            _ => None,
        }
    }

    pub fn begin(&mut self, store: &mut DappStore) -> Option<SigningJob> {
        let batch = store.transactions_to_sign()?.clone();
        if batch.session_id.is_empty() {
            return None;
        }
        self.apply(CoordinatorAction::BatchArrived);
        self.in_flight = Some(batch.session_id.clone());
        self.session_id = batch.session_id.clone();
        self.callback_route = batch.callback_route.clone();
        self.error = None;
        self.steps = None;
        self.summaries.clear();
        self.last_redirect = None;

        let Some(provider) = store.provider() else {
            warn!(session_id = %batch.session_id, "batch queued without a signer");
            self.provider_type = None;
            self.show_error(SigningError::NoSigner.to_string());
            return None;
        };
        self.provider_type = Some(provider.provider_type());

        if let Err(e) = validate_chain_ids(&batch.transactions, store.chain_id()) {
            warn!(session_id = %batch.session_id, error = ?e, "batch targets another network");
            self.show_error(e.to_string());
            if self.config.chain_mismatch == ChainMismatchPolicy::Halt {
                self.fail(store, &batch.session_id, e);
                return None;
            }
        }

        Some(SigningJob {
            session_id: batch.session_id,
            callback_route: batch.callback_route,
            transactions: batch.transactions,
            address: store.address(),
            local_nonce: store.account_nonce(),
            provider,
            network: store.network().clone(),
            origin: self.config.origin.clone(),
        })
    }

    pub fn finish(&mut self, store: &mut DappStore, outcome: JobOutcome) {
        let still_pending = store
            .transactions_to_sign()
            .is_some_and(|b| b.session_id == outcome.session_id);
        if self.in_flight.as_deref() != Some(outcome.session_id.as_str()) || !still_pending {
            debug!(session_id = %outcome.session_id, "dropping outcome of a batch no longer pending");
            return;
        }

        match outcome.result {
            Ok(Dispatched::Redirected { transactions, url }) => {
                store.dispatch(StoreAction::UpdatePendingTransactions {
                    session_id: outcome.session_id.clone(),
                    transactions,
                });
                info!(session_id = %outcome.session_id, "handed batch to web wallet");
                self.last_redirect = Some(url);
            }
            Ok(Dispatched::Signed(signed)) => {
                store.dispatch(StoreAction::UpdateBatchStatus {
                    session_id: outcome.session_id,
                    status: BatchStatus::Signed,
                    transactions: Some(signed),
                });
                self.close(store);
            }
            Ok(Dispatched::AwaitingProvider {
                provider_type,
                transactions,
                summaries,
            }) => {
                store.dispatch(StoreAction::UpdatePendingTransactions {
                    session_id: outcome.session_id.clone(),
                    transactions: transactions.clone(),
                });
                info!(
                    session_id = %outcome.session_id,
                    %provider_type,
                    count = transactions.len(),
                    "awaiting provider confirmation"
                );
                self.steps = Some(SignSteps::new(
                    outcome.session_id,
                    transactions,
                    provider_type,
                ));
                self.summaries = summaries;
                self.show_sign_modal = true;
            }
            Err(e) => self.fail(store, &outcome.session_id, e),
        }
    }

    /// Runs all three phases inline.
    pub fn handle_pending<A>(&mut self, store: &mut DappStore, api: &A)
    where
        A: AccountPort + TokenDetailsPort + ?Sized,
    {
        if let Some(job) = self.begin(store) {
            let outcome = job.run(api);
            self.finish(store, outcome);
        }
    }

    /// Inline variant of [`Self::on_event`] for callers without a worker.
    pub fn process_event<A>(&mut self, store: &mut DappStore, event: &StoreEvent, api: &A)
    where
        A: AccountPort + TokenDetailsPort + ?Sized,
    {
        if let Some(job) = self.on_event(store, event) {
            let outcome = job.run(api);
            self.finish(store, outcome);
        }
    }

    /// Signs the transactions of the current confirmation screen.
    pub fn sign_current_step(&mut self, store: &mut DappStore) -> Result<StepOutcome, SigningError> {
        let provider = store.provider().ok_or(SigningError::NoSigner)?;
        let steps = self.steps.as_mut().ok_or(SigningError::NoActiveSteps)?;
        let result = steps.sign_current(provider.as_ref());
        let session_id = steps.session_id().to_owned();

        match result {
            Ok(StepOutcome::Completed(signed)) => {
                info!(%session_id, count = signed.len(), "batch signed");
                store.dispatch(StoreAction::UpdateBatchStatus {
                    session_id,
                    status: BatchStatus::Signed,
                    transactions: Some(signed.clone()),
                });
                self.close(store);
                Ok(StepOutcome::Completed(signed))
            }
            Ok(StepOutcome::Next) => Ok(StepOutcome::Next),
            Err(e) => {
                let err = SigningError::from(e);
                self.fail(store, &session_id, err.clone());
                Err(err)
            }
        }
    }

    /// User dismissed the request without signing.
    pub fn cancel(&mut self, store: &mut DappStore) {
        let pending = store
            .transactions_to_sign()
            .filter(|b| b.session_id == self.session_id && b.status == BatchStatus::Pending)
            .map(|b| b.session_id.clone());
        if let Some(session_id) = pending {
            store.dispatch(StoreAction::UpdateBatchStatus {
                session_id,
                status: BatchStatus::Cancelled,
                transactions: None,
            });
        }
        self.close(store);
    }

    /// Resets the modal and drops the pending batch from the store.
    pub fn close(&mut self, store: &mut DappStore) {
        self.callback_route.clear();
        self.error = None;
        self.show_sign_modal = false;
        self.steps = None;
        self.summaries.clear();
        self.in_flight = None;
        self.apply(CoordinatorAction::Close);
        store.dispatch(StoreAction::ClearPendingBatch);
    }

    fn show_error(&mut self, message: String) {
        self.show_sign_modal = true;
        self.error = Some(message);
    }

    fn fail(&mut self, store: &mut DappStore, session_id: &str, err: SigningError) {
        error!(%session_id, error = %err, "error when signing");
        store.dispatch(StoreAction::UpdateBatchStatus {
            session_id: session_id.to_owned(),
            status: BatchStatus::Cancelled,
            transactions: None,
        });
        self.apply(CoordinatorAction::Fail);
        self.steps = None;
        self.show_error(err.to_string());
    }

    fn apply(&mut self, action: CoordinatorAction) {
        match coordinator_transition(self.state, action) {
            Ok((to, transition)) => {
                self.state = to;
                self.last_transition = Some(transition);
            }
            Err(e) => debug!(error = %e, "ignored coordinator action"),
        }
    }
}
