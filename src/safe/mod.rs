//! Safe wallet protocol
//!
//! Deploys single-owner Safe proxies and drives owner transactions through them:
//!
//! - [`deploy_safe`]: `createProxyWithNonce` with a predicted, then confirmed, address
//! - [`prepare_transaction`]: read the Safe nonce and the EIP-712 transaction digest
//! - [`execute_transaction`]: sign the digest, normalize, submit `execTransaction`

pub mod deploy;
pub mod signature;
pub mod transaction;

pub use deploy::{deploy_safe, safe_setup_initializer, SafeDeployParams, SafeDeployment};
pub use signature::normalize_signature;
pub use transaction::{execute_transaction, prepare_transaction};

use alloy_primitives::{Address, Bytes, B256, U256};

/// Safe transaction operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        op as u8
    }
}

/// A Safe transaction ready to be signed and executed.
///
/// Gas refund fields are always zero: the signing account pays its own gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    /// Safe nonce the digest was computed for
    pub nonce: U256,
    /// `getTransactionHash(...)` as returned by the Safe
    pub hash: B256,
}
