//! Amount and fee formatting.
//!
//! Amounts travel as integer strings in the token's smallest unit and are
//! turned into comma-grouped decimals for display. The last shown decimal is
//! truncated, never rounded.

use alloy::primitives::U256;
use thiserror::Error;

use crate::domain::{NetworkConfig, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not an integer: {0}")]
    NotInteger(String),
    #[error("amount is not a decimal number: {0}")]
    NotDecimal(String),
    #[error("amount has more than {decimals} decimals: {input}")]
    TooPrecise { input: String, decimals: u32 },
    #[error("amount does not fit in 256 bits: {0}")]
    Overflow(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatAmountOptions {
    pub decimals: u32,
    pub digits: u32,
    pub show_last_non_zero_decimal: bool,
    pub add_commas: bool,
}

impl Default for FormatAmountOptions {
    fn default() -> Self {
        Self {
            decimals: 18,
            digits: 4,
            show_last_non_zero_decimal: false,
            add_commas: true,
        }
    }
}

impl FormatAmountOptions {
    pub fn for_network(network: &NetworkConfig) -> Self {
        Self {
            decimals: network.decimals,
            digits: network.digits,
            ..Self::default()
        }
    }
}

pub fn format_amount(input: &str, opts: &FormatAmountOptions) -> Result<String, AmountError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(AmountError::Empty);
    }
    let (negative, magnitude) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::NotInteger(raw.to_owned()));
    }
    U256::from_str_radix(magnitude, 10).map_err(|_| AmountError::Overflow(raw.to_owned()))?;

    let trimmed = magnitude.trim_start_matches('0');
    let decimals = opts.decimals as usize;
    let padded = format!("{trimmed:0>width$}", width = decimals + 1);
    let (int_part, frac_full) = padded.split_at(padded.len() - decimals);

    let frac = shown_decimals(int_part, frac_full, opts);
    let int_shown = if opts.add_commas {
        group_thousands(int_part)
    } else {
        int_part.to_owned()
    };

    let mut out = String::new();
    if negative && !trimmed.is_empty() {
        out.push('-');
    }
    out.push_str(&int_shown);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    Ok(out)
}

fn shown_decimals(int_part: &str, frac_full: &str, opts: &FormatAmountOptions) -> String {
    let digits = opts.digits as usize;
    if opts.show_last_non_zero_decimal {
        let significant = frac_full.trim_end_matches('0');
        return format!("{significant:0<digits$}");
    }
    if digits == 0 {
        return String::new();
    }
    let mut frac: String = frac_full.chars().take(digits).collect();
    let hidden_non_zero = frac_full.chars().skip(digits).any(|c| c != '0');
    if int_part == "0" && frac.bytes().all(|b| b == b'0') && hidden_non_zero {
        // Tiny amounts show up to their first non-zero decimal instead of 0.0000.
        if let Some(pos) = frac_full.find(|c: char| c != '0') {
            frac = frac_full[..=pos].to_owned();
        }
    }
    format!("{frac:0<digits$}")
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parses a human decimal ("1.5") into smallest units.
pub fn parse_amount(input: &str, decimals: u32) -> Result<U256, AmountError> {
    let raw = input.trim().replace(',', "");
    if raw.is_empty() {
        return Err(AmountError::Empty);
    }
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, f),
        None => (raw.as_str(), ""),
    };
    let valid = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !valid(int_part) || !valid(frac_part) {
        return Err(AmountError::NotDecimal(raw.clone()));
    }
    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            input: raw.clone(),
            decimals,
        });
    }
    let units = format!(
        "{}{:0<width$}",
        int_part,
        frac_trimmed,
        width = decimals as usize
    );
    let units = units.trim_start_matches('0');
    if units.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(units, 10).map_err(|_| AmountError::Overflow(raw))
}

/// Network fee in smallest units: move-balance gas at full price plus the
/// remaining gas at the discounted processing price.
pub fn calculate_fee(tx: &Transaction, network: &NetworkConfig) -> U256 {
    let gas_price = U256::from(tx.gas_price);
    let gas_limit = U256::from(tx.gas_limit);
    let data_gas = U256::from(tx.data_len() as u64) * U256::from(network.gas_per_data_byte);
    let move_balance_gas = (U256::from(network.min_gas_limit) + data_gas).min(gas_limit);
    let processing_gas = gas_limit - move_balance_gas;

    let denominator = U256::from(network.gas_price_modifier_denominator.max(1));
    let processing_fee =
        processing_gas * gas_price * U256::from(network.gas_price_modifier_numerator) / denominator;
    move_balance_gas * gas_price + processing_fee
}

pub fn format_fee(tx: &Transaction, network: &NetworkConfig) -> Result<String, AmountError> {
    let fee = calculate_fee(tx, network);
    format_amount(&fee.to_string(), &FormatAmountOptions::for_network(network))
}
