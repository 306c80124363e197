pub mod clock;
pub mod config;
pub mod network_api;
pub mod signer;
pub mod web_wallet;

pub use clock::SystemClockAdapter;
pub use config::{ConfigError, SigningAdapterConfig};
pub use network_api::HttpNetworkApi;
pub use signer::BridgeSignerAdapter;
pub use web_wallet::WebWalletAdapter;
