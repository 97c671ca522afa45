use alloy_primitives::{Address, TxHash, B256};
use serde::{Deserialize, Serialize};

/// Everything created by a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResult {
    pub wallet_address: Address,
    pub role_module_address: Address,
    /// Yield proxy the client will get; not deployed by the run
    pub predicted_proxy_address: Address,
    pub role_key: B256,
    pub transactions: TransactionHashes,
}

/// Hashes of every transaction sent by a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHashes {
    pub wallet_deployment_hash: TxHash,
    pub role_module_deployment_hash: TxHash,
    pub module_enable_hash: TxHash,
    /// In submission order
    pub permission_configuration_hashes: Vec<TxHash>,
}

impl TransactionHashes {
    /// All hashes in the order the transactions were sent.
    pub fn in_order(&self) -> Vec<TxHash> {
        let mut hashes = vec![self.wallet_deployment_hash, self.role_module_deployment_hash];
        hashes.extend_from_slice(&self.permission_configuration_hashes);
        hashes.push(self.module_enable_hash);
        hashes
    }
}
