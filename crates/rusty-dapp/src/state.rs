//! Form state for the shell's panels.

use alloy::primitives::U256;

use rusty_dapp_signing_core::{
    parse_amount, Address, NetworkConfig, ProviderType, Transaction,
};

pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;
const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct LoginFormState {
    pub provider_type: ProviderType,
    pub address: String,
}

impl Default for LoginFormState {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::Extension,
            address: String::new(),
        }
    }
}

impl LoginFormState {
    pub fn parsed_address(&self) -> Result<Address, String> {
        self.address
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[derive(Debug, Clone)]
pub struct BatchFormState {
    pub receiver: String,
    pub amount: String,
    pub data: String,
    pub count: String,
    /// Empty means the minimum for the payload.
    pub gas_limit: String,
    pub callback_route: String,
}

impl Default for BatchFormState {
    fn default() -> Self {
        Self {
            receiver: String::new(),
            amount: "0.1".to_owned(),
            data: String::new(),
            count: "1".to_owned(),
            gas_limit: String::new(),
            callback_route: "/dashboard".to_owned(),
        }
    }
}

impl BatchFormState {
    pub fn build_transactions(
        &self,
        sender: Address,
        network: &NetworkConfig,
    ) -> Result<Vec<Transaction>, String> {
        let receiver: Address = self
            .receiver
            .parse()
            .map_err(|e| format!("Invalid receiver: {e}"))?;
        let value: U256 = parse_amount(&self.amount, network.decimals)
            .map_err(|e| format!("Invalid amount: {e}"))?;
        let count: usize = self
            .count
            .trim()
            .parse()
            .ok()
            .filter(|n| (1..=MAX_BATCH_SIZE).contains(n))
            .ok_or_else(|| format!("Batch size must be between 1 and {MAX_BATCH_SIZE}"))?;

        let data = Some(self.data.trim().to_owned()).filter(|d| !d.is_empty());
        let min_gas = network.min_gas_limit
            + data.as_deref().map(str::len).unwrap_or(0) as u64 * network.gas_per_data_byte;
        let gas_limit = match self.gas_limit.trim() {
            "" => min_gas,
            raw => {
                let limit: u64 = raw.parse().map_err(|_| format!("Invalid gas limit: {raw}"))?;
                if limit < min_gas {
                    return Err(format!("Gas limit must be at least {min_gas}"));
                }
                limit
            }
        };

        Ok((0..count)
            .map(|_| Transaction {
                nonce: 0,
                value,
                receiver,
                sender,
                gas_price: DEFAULT_GAS_PRICE,
                gas_limit,
                data: data.clone(),
                chain_id: network.chain_id.clone(),
                version: 1,
                signature: None,
            })
            .collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SecurityPanelState {
    pub show_authorization: bool,
    pub duration: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeState {
    pub last_error: Option<String>,
    pub last_info: Option<String>,
}

impl NoticeState {
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_info = None;
        self.last_error = Some(message.into());
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.last_error = None;
        self.last_info = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.last_error = None;
        self.last_info = None;
    }
}
