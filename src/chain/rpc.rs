use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash, B256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use super::{ChainError, ChainReader, ChainWriter, TxReceipt, TxRequest};
use crate::signer::signature_to_bytes;

/// JSON-RPC backed chain client bound to one local private key.
///
/// Implements both [`ChainReader`] and [`ChainWriter`] over the same HTTP transport.
/// Nonces are always supplied by the caller; the provider's nonce filler leaves
/// requests with an explicit nonce untouched.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    signer: PrivateKeySigner,
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient").field("account", &self.signer.address()).finish()
    }
}

impl RpcChainClient {
    /// Connect to `rpc_url` with `signer` as the transaction sender.
    pub fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ChainError> {
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| ChainError::Rpc(format!("invalid RPC URL {rpc_url}: {e}")))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(url)
            .erased();
        Ok(Self { provider, signer })
    }
}

fn rpc_error(err: impl std::fmt::Display) -> ChainError {
    ChainError::Rpc(err.to_string())
}

#[async_trait]
impl ChainReader for RpcChainClient {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider.get_chain_id().await.map_err(rpc_error)
    }

    async fn pending_transaction_count(&self, account: Address) -> Result<u64, ChainError> {
        self.provider.get_transaction_count(account).pending().await.map_err(rpc_error)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let request = TransactionRequest::default().with_to(to).with_input(data);
        self.provider.call(request).await.map_err(rpc_error)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(rpc_error)?;

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
            logs: receipt.inner.logs().iter().map(|log| log.inner.clone()).collect(),
        })
    }
}

#[async_trait]
impl ChainWriter for RpcChainClient {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, ChainError> {
        let request = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_to(tx.to)
            .with_value(tx.value)
            .with_input(tx.data)
            .with_nonce(tx.nonce);

        let pending = self.provider.send_transaction(request).await.map_err(rpc_error)?;
        Ok(*pending.tx_hash())
    }

    async fn sign_hash(&self, hash: B256) -> Result<Bytes, ChainError> {
        let signature = self
            .signer
            .sign_hash(&hash)
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;
        Ok(Bytes::copy_from_slice(&signature_to_bytes(&signature)))
    }
}
