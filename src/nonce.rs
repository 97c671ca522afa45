//! Run-scoped transaction nonce sequencing.
//!
//! Every transaction of an onboarding run is sent from the same account with an
//! explicitly assigned nonce. Asking the node for a "pending" nonce before each send
//! can return a stale value while earlier transactions are still propagating, so the
//! run seeds one counter from the node and hands out nonces from it.

use alloy_primitives::Address;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::chain::{ChainError, ChainReader};

/// Monotonic nonce counter for one signing account.
///
/// Not persisted and not shared between runs.
#[derive(Debug)]
pub struct NonceSequencer {
    account: Address,
    next: AtomicU64,
}

impl NonceSequencer {
    /// Start handing out nonces from `first`.
    pub fn new(account: Address, first: u64) -> Self {
        Self { account, next: AtomicU64::new(first) }
    }

    /// Seed from the account's pending transaction count.
    pub async fn from_chain(reader: &dyn ChainReader, account: Address) -> Result<Self, ChainError> {
        let first = reader.pending_transaction_count(account).await?;
        tracing::debug!(target: "onboarding::nonce", %account, first, "nonce sequencer seeded");
        Ok(Self::new(account, first))
    }

    /// Account the nonces belong to.
    pub fn account(&self) -> Address {
        self.account
    }

    /// Return the next nonce and advance the counter.
    pub fn consume(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Return the next nonce without consuming it.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}
