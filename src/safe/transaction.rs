use alloy_primitives::{Address, Bytes, TxHash, U256};

use super::{normalize_signature, Operation, PendingTransaction};
use crate::chain::{ChainContext, TxRequest};
use crate::contracts::ISafe;
use crate::errors::OnboardingError;
use crate::nonce::NonceSequencer;

/// Build a Safe transaction against the Safe's current nonce and fetch its digest.
pub async fn prepare_transaction(
    ctx: &ChainContext,
    safe: Address,
    to: Address,
    data: Bytes,
    value: U256,
    operation: Operation,
) -> Result<PendingTransaction, OnboardingError> {
    let nonce = ctx.read(safe, &ISafe::nonceCall {}).await?;

    let mut pending = PendingTransaction {
        to,
        value,
        data,
        operation,
        safe_tx_gas: U256::ZERO,
        base_gas: U256::ZERO,
        gas_price: U256::ZERO,
        gas_token: Address::ZERO,
        refund_receiver: Address::ZERO,
        nonce,
        hash: Default::default(),
    };

    let hash_call = ISafe::getTransactionHashCall {
        to: pending.to,
        value: pending.value,
        data: pending.data.clone(),
        operation: pending.operation.into(),
        safeTxGas: pending.safe_tx_gas,
        baseGas: pending.base_gas,
        gasPrice: pending.gas_price,
        gasToken: pending.gas_token,
        refundReceiver: pending.refund_receiver,
        nonce: pending.nonce,
    };
    pending.hash = ctx.read(safe, &hash_call).await?;

    tracing::debug!(target: "onboarding::safe", %safe, %to, safe_nonce = %nonce, hash = %pending.hash, "safe transaction prepared");
    Ok(pending)
}

/// Sign `pending` with the run's account and execute it on `safe`.
///
/// The digest is signed as-is, without a message prefix, which is what Safe verifies
/// for an owner signature with `v` in `{27, 28}`.
pub async fn execute_transaction(
    ctx: &ChainContext,
    nonces: &NonceSequencer,
    safe: Address,
    pending: &PendingTransaction,
) -> Result<TxHash, OnboardingError> {
    let raw = ctx.writer().sign_hash(pending.hash).await?;
    let signatures = normalize_signature(&raw)?;

    let call = ISafe::execTransactionCall {
        to: pending.to,
        value: pending.value,
        data: pending.data.clone(),
        operation: pending.operation.into(),
        safeTxGas: pending.safe_tx_gas,
        baseGas: pending.base_gas,
        gasPrice: pending.gas_price,
        gasToken: pending.gas_token,
        refundReceiver: pending.refund_receiver,
        signatures,
    };
    let receipt = ctx.submit(TxRequest::call(safe, &call, nonces.consume())).await?;

    tracing::info!(target: "onboarding::safe", %safe, tx_hash = %receipt.tx_hash, "safe transaction executed");
    Ok(receipt.tx_hash)
}
