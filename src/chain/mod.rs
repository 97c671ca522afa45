//! Chain client seam
//!
//! The onboarding pipeline never talks to a node directly. It drives two narrow
//! capabilities:
//!
//! - [`ChainReader`]: chain id, pending transaction count, `eth_call`, receipt waiting
//! - [`ChainWriter`]: the single signing account, transaction submission, raw hash signing
//!
//! Production wiring lives in [`rpc`] (alloy HTTP provider + local key). Tests use the
//! in-memory chain from `crate::testing`.

pub mod rpc;

pub use rpc::RpcChainClient;

use alloy_primitives::{Address, Bytes, Log, TxHash, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::errors::{OnboardingError, ProtocolError};

/// Errors surfaced by the chain transport
#[derive(Debug, Error)]
pub enum ChainError {
    /// The node rejected or failed the request
    #[error("RPC request failed: {0}")]
    Rpc(String),

    /// The transaction was mined but reverted
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// The signing backend failed
    #[error("signing failed: {0}")]
    Signing(String),
}

/// A transaction from the signing account with an explicitly assigned nonce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Target contract
    pub to: Address,
    /// Native value in wei
    pub value: U256,
    /// Encoded calldata
    pub data: Bytes,
    /// Account nonce, always taken from the run's `NonceSequencer`
    pub nonce: u64,
}

impl TxRequest {
    /// Zero-value call to `to` with the ABI-encoded `call`.
    pub fn call<C: SolCall>(to: Address, call: &C, nonce: u64) -> Self {
        Self { to, value: U256::ZERO, data: call.abi_encode().into(), nonce }
    }
}

/// Confirmation record for a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Execution status
    pub success: bool,
    /// Every log emitted during execution, in order
    pub logs: Vec<Log>,
}

/// Read access to the network.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Chain id of the connected network.
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Transaction count of `account` including pending transactions.
    async fn pending_transaction_count(&self, account: Address) -> Result<u64, ChainError>;

    /// Execute a read-only call against the latest state.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError>;

    /// Block until the transaction is mined and return its receipt.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError>;
}

/// Write access bound to exactly one signing account.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Address;

    /// Sign and broadcast a transaction, returning its hash without waiting.
    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, ChainError>;

    /// Sign a 32-byte digest without any message prefix.
    ///
    /// Returns `r || s || v`; backends may report `v` as either `{0, 1}` or `{27, 28}`.
    async fn sign_hash(&self, hash: B256) -> Result<Bytes, ChainError>;
}

/// Reader and writer bound to the same network.
#[derive(Clone)]
pub struct ChainContext {
    reader: Arc<dyn ChainReader>,
    writer: Arc<dyn ChainWriter>,
}

impl std::fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext").field("account", &self.writer.address()).finish()
    }
}

impl ChainContext {
    /// Bundle a reader and a writer.
    pub fn new(reader: Arc<dyn ChainReader>, writer: Arc<dyn ChainWriter>) -> Self {
        Self { reader, writer }
    }

    /// The signing account.
    pub fn account(&self) -> Address {
        self.writer.address()
    }

    pub fn reader(&self) -> &dyn ChainReader {
        self.reader.as_ref()
    }

    pub fn writer(&self) -> &dyn ChainWriter {
        self.writer.as_ref()
    }

    /// Typed `eth_call`: encode `call`, execute it at `to`, decode the return value.
    pub async fn read<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return, OnboardingError> {
        let output = self.reader.call(to, call.abi_encode().into()).await?;
        C::abi_decode_returns(&output).map_err(|e| {
            ProtocolError::UndecodableReturn { function: C::SIGNATURE, reason: e.to_string() }
                .into()
        })
    }

    /// Broadcast a transaction and wait for a successful receipt.
    pub async fn submit(&self, tx: TxRequest) -> Result<TxReceipt, ChainError> {
        let nonce = tx.nonce;
        let tx_hash = self.writer.send_transaction(tx).await?;
        tracing::debug!(target: "onboarding::chain", %tx_hash, nonce, "transaction sent");

        let receipt = self.reader.wait_for_receipt(tx_hash).await?;
        if !receipt.success {
            return Err(ChainError::Reverted(tx_hash));
        }
        Ok(receipt)
    }
}

/// Find the first log emitted by `emitter` that decodes as event `E`.
///
/// Receipts interleave events from every contract touched by the transaction, so
/// logs from other addresses and logs that fail to decode are skipped.
pub fn find_event<E: SolEvent>(logs: &[Log], emitter: Address) -> Option<E> {
    logs.iter()
        .filter(|log| log.address == emitter)
        .find_map(|log| E::decode_log_data(&log.data).ok())
}
