use crate::domain::{ChainId, Transaction};
use crate::error::SigningError;

/// First nonce of a new batch: whichever of the on-chain and locally tracked
/// account nonces is further ahead.
pub fn next_nonce(chain_nonce: u64, local_nonce: u64) -> u64 {
    chain_nonce.max(local_nonce)
}

/// Assigns `start, start + 1, ...` in batch order. Leaves the batch untouched
/// when the last nonce would not fit in a `u64`.
pub fn assign_nonces(transactions: &mut [Transaction], start: u64) -> Result<(), SigningError> {
    let count = transactions.len() as u64;
    if count > 0 && start.checked_add(count - 1).is_none() {
        return Err(SigningError::NonceOverflow { start, count });
    }
    for (tx, nonce) in transactions.iter_mut().zip(start..) {
        tx.nonce = nonce;
    }
    Ok(())
}

/// Fails on the first transaction bound to another chain.
pub fn validate_chain_ids(transactions: &[Transaction], expected: &ChainId) -> Result<(), SigningError> {
    match transactions.iter().find(|tx| &tx.chain_id != expected) {
        Some(tx) => Err(SigningError::ChainIdMismatch {
            expected: expected.clone(),
            found: tx.chain_id.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;
    use crate::domain::Address;

    fn tx(chain: &str) -> Transaction {
        Transaction {
            nonce: 0,
            value: U256::ZERO,
            receiver: Address::ZERO,
            sender: Address::ZERO,
            gas_price: 1_000_000_000,
            gas_limit: 50_000,
            data: None,
            chain_id: ChainId::new(chain),
            version: 1,
            signature: None,
        }
    }

    #[test]
    fn nonces_start_from_the_larger_counter() {
        let mut txs = vec![tx("D"), tx("D"), tx("D")];
        assign_nonces(&mut txs, next_nonce(5, 7)).expect("fits");
        assert_eq!(txs.iter().map(|t| t.nonce).collect::<Vec<_>>(), vec![7, 8, 9]);

        assign_nonces(&mut txs, next_nonce(12, 7)).expect("fits");
        assert_eq!(txs.iter().map(|t| t.nonce).collect::<Vec<_>>(), vec![12, 13, 14]);
    }

    #[test]
    fn nonce_past_u64_max_is_rejected() {
        let mut txs = vec![tx("D"), tx("D")];
        let err = assign_nonces(&mut txs, u64::MAX).expect_err("overflow");
        assert_eq!(
            err,
            SigningError::NonceOverflow {
                start: u64::MAX,
                count: 2
            }
        );
        assert!(txs.iter().all(|t| t.nonce == 0));

        let mut single = vec![tx("D")];
        assign_nonces(&mut single, u64::MAX).expect("last nonce fits");
        assert_eq!(single[0].nonce, u64::MAX);
        assert!(assign_nonces(&mut [], u64::MAX).is_ok());
    }

    #[test]
    fn chain_validation_reports_first_mismatch() {
        let txs = vec![tx("D"), tx("1"), tx("T")];
        let err = validate_chain_ids(&txs, &ChainId::new("D")).expect_err("mismatch");
        assert_eq!(
            err,
            SigningError::ChainIdMismatch {
                expected: ChainId::new("D"),
                found: ChainId::new("1"),
            }
        );
        assert!(validate_chain_ids(&txs[..1], &ChainId::new("D")).is_ok());
        assert!(validate_chain_ids(&[], &ChainId::new("D")).is_ok());
    }
}
