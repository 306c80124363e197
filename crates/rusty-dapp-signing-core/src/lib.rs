pub mod alert;
pub mod batch;
pub mod callback;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod format;
pub mod ports;
pub mod state_machine;
pub mod steps;
pub mod store;
pub mod summary;
pub mod token_info;

pub use alert::{AlertView, AuthorizationInfo, ConfirmationPanel, ScamPhishingAlert};
pub use batch::{assign_nonces, next_nonce, validate_chain_ids};
pub use callback::{
    parse_wallet_callback, reply_url, wallet_callback_url, WalletCallback, WalletCallbackOutcome,
    WALLET_SIGN_SESSION,
};
pub use coordinator::{
    ChainMismatchPolicy, CoordinatorConfig, Dispatched, JobOutcome, SignProps, SigningCoordinator,
    SigningJob,
};
pub use domain::{
    AccountOnNetwork, Address, AddressError, BatchStatus, ChainId, NetworkConfig, NftType,
    ProviderType, ScamInfo, SignedBatch, TokenDetails, Transaction,
    TransactionBatch,
};
pub use error::{SigningError, CHAIN_CHANGED_MESSAGE, MISSING_SIGNER_MESSAGE};
pub use format::{calculate_fee, format_amount, parse_amount, AmountError, FormatAmountOptions};
pub use ports::{
    AccountPort, ClockPort, PortError, SignOptions, SignOutcome, SigningProvider, TokenDetailsPort,
};
pub use state_machine::{coordinator_transition, CoordinatorAction, CoordinatorState, StateTransition};
pub use steps::{SignSteps, StepOutcome};
pub use store::{DappStore, StoreAction, StoreEvent};
pub use summary::{DataView, TransactionSummary};
pub use token_info::{nft_identifier, ActiveTransaction, IdentifierType, TransactionTokenInfo};
