use thiserror::Error;

use crate::domain::{AccountOnNetwork, Address, ProviderType, TokenDetails, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected by signer: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// Already percent-encoded callback for redirect-based providers.
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    /// Signing continues outside the app; the batch result arrives via callback.
    Redirected { url: String },
    Signed(Vec<Transaction>),
}

/// A configured signing provider. Its runtime type decides the dispatch path.
pub trait SigningProvider: Send + Sync {
    fn provider_type(&self) -> ProviderType;
    fn sign_transactions(
        &self,
        transactions: &[Transaction],
        options: &SignOptions,
    ) -> Result<SignOutcome, PortError>;
}

pub trait AccountPort {
    fn account(&self, address: &Address) -> Result<AccountOnNetwork, PortError>;
}

pub trait TokenDetailsPort {
    /// `Ok(None)` when the identifier is unknown to the network.
    fn token_details(&self, identifier: &str) -> Result<Option<TokenDetails>, PortError>;
}

pub trait ClockPort {
    fn now_ms(&self) -> Result<u64, PortError>;
}
