use thiserror::Error;

use crate::domain::{AddressError, ChainId};
use crate::ports::PortError;

/// Shown when a batch arrives and no provider is logged in.
pub const MISSING_SIGNER_MESSAGE: &str = "You need a signer/valid signer to send a transaction, use either WalletProvider, LedgerProvider or WalletConnect";

/// Shown when a batch carries a chain ID other than the configured one.
pub const CHAIN_CHANGED_MESSAGE: &str = "The application tried to change the transaction network";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("{}", MISSING_SIGNER_MESSAGE)]
    NoSigner,
    #[error("{}", CHAIN_CHANGED_MESSAGE)]
    ChainIdMismatch { expected: ChainId, found: ChainId },
    #[error("no account address is logged in")]
    MissingAddress,
    #[error("nonce overflow: {count} transactions starting at {start}")]
    NonceOverflow { start: u64, count: u64 },
    #[error("illegal coordinator transition: {from} -> {action}")]
    IllegalTransition { from: String, action: String },
    #[error("invalid callback url: {0}")]
    InvalidCallbackUrl(String),
    #[error("no signing steps are active")]
    NoActiveSteps,
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    #[error(transparent)]
    Port(#[from] PortError),
}
