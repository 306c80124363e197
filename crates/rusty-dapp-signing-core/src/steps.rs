//! Step-by-step confirmation for providers that sign inside the app
//! (extension, ledger, wallet-connect).

use std::ops::Range;

use crate::domain::{ProviderType, Transaction};
use crate::ports::{PortError, SignOptions, SignOutcome, SigningProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Next,
    Completed(Vec<Transaction>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignSteps {
    session_id: String,
    /// One chunk per confirmation screen.
    chunks: Vec<Vec<Transaction>>,
    current: usize,
    signed: Vec<Transaction>,
}

impl SignSteps {
    pub fn new(session_id: impl Into<String>, transactions: Vec<Transaction>, provider_type: ProviderType) -> Self {
        let chunks = if provider_type.signs_one_by_one() {
            transactions.into_iter().map(|tx| vec![tx]).collect()
        } else if transactions.is_empty() {
            Vec::new()
        } else {
            vec![transactions]
        };
        Self {
            session_id: session_id.into(),
            chunks,
            current: 0,
            signed: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.chunks.len()
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.chunks.len()
    }

    pub fn current_transactions(&self) -> &[Transaction] {
        self.chunks.get(self.current).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.chunks.iter().flatten()
    }

    /// Positions of the current chunk within the whole batch.
    pub fn current_range(&self) -> Range<usize> {
        let start: usize = self.chunks.iter().take(self.current).map(Vec::len).sum();
        start..start + self.current_transactions().len()
    }

    pub fn sign_current(&mut self, provider: &dyn SigningProvider) -> Result<StepOutcome, PortError> {
        let chunk: Vec<Transaction> = self
            .current_transactions()
            .iter()
            .map(Transaction::unsigned)
            .collect();
        if chunk.is_empty() {
            return Err(PortError::Validation("no transaction left to sign".to_owned()));
        }
        let signed = match provider.sign_transactions(&chunk, &SignOptions::default())? {
            SignOutcome::Signed(signed) => signed,
            SignOutcome::Redirected { url } => {
                return Err(PortError::Validation(format!(
                    "provider redirected during in-app signing: {url}"
                )))
            }
        };
        if signed.len() != chunk.len() {
            return Err(PortError::Validation(format!(
                "provider returned {} signed transactions for {}",
                signed.len(),
                chunk.len()
            )));
        }
        self.signed.extend(signed);
        self.current += 1;
        if self.is_done() {
            Ok(StepOutcome::Completed(self.signed.clone()))
        } else {
            Ok(StepOutcome::Next)
        }
    }
}
