use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::SolCall;

use crate::chain::{find_event, ChainContext, TxRequest};
use crate::constants::SAFE_THRESHOLD;
use crate::contracts::{ISafe, ISafeProxyFactory, ISafeProxyFactoryV130, ISafeProxyFactoryV141};
use crate::errors::{DeployedContract, OnboardingError, ProtocolError};
use crate::nonce::NonceSequencer;
use crate::predictor::{predict_safe_address, random_salt_nonce};

/// Inputs of a Safe deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeDeployParams {
    /// Sole owner of the new Safe
    pub owner: Address,
    /// Safe singleton the proxy delegates to
    pub singleton: Address,
    /// Safe proxy factory
    pub factory: Address,
    /// CREATE2 salt nonce; a fresh one is drawn when absent
    pub salt_nonce: Option<U256>,
}

/// A confirmed Safe deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeDeployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub salt_nonce: U256,
}

/// `setup([owner], 1, 0x0, 0x, 0x0, 0x0, 0, 0x0)`: single owner, no modules, no
/// fallback handler, no payment.
pub fn safe_setup_initializer(owner: Address) -> Bytes {
    ISafe::setupCall {
        owners: vec![owner],
        threshold: U256::from(SAFE_THRESHOLD),
        to: Address::ZERO,
        data: Bytes::new(),
        fallbackHandler: Address::ZERO,
        paymentToken: Address::ZERO,
        payment: U256::ZERO,
        paymentReceiver: Address::ZERO,
    }
    .abi_encode()
    .into()
}

/// Deploy a Safe proxy owned by `params.owner` and confirm it landed at the predicted
/// address.
///
/// The factory's `ProxyCreation` event is decoded with the v1.4.1 layout first and the
/// v1.3.0 layout second.
pub async fn deploy_safe(
    ctx: &ChainContext,
    nonces: &NonceSequencer,
    params: &SafeDeployParams,
) -> Result<SafeDeployment, OnboardingError> {
    let initializer = safe_setup_initializer(params.owner);
    let salt_nonce = params.salt_nonce.unwrap_or_else(random_salt_nonce);

    let creation_code = ctx.read(params.factory, &ISafeProxyFactory::proxyCreationCodeCall {}).await?;
    let predicted =
        predict_safe_address(params.factory, &creation_code, params.singleton, &initializer, salt_nonce);
    tracing::info!(target: "onboarding::safe", owner = %params.owner, %predicted, %salt_nonce, "deploying safe");

    let call = ISafeProxyFactory::createProxyWithNonceCall {
        singleton: params.singleton,
        initializer,
        saltNonce: salt_nonce,
    };
    let receipt = ctx.submit(TxRequest::call(params.factory, &call, nonces.consume())).await?;

    let observed = find_event::<ISafeProxyFactoryV141::ProxyCreation>(&receipt.logs, params.factory)
        .map(|event| event.proxy)
        .or_else(|| {
            find_event::<ISafeProxyFactoryV130::ProxyCreation>(&receipt.logs, params.factory)
                .map(|event| event.proxy)
        })
        .ok_or(ProtocolError::MissingCreationEvent {
            contract: DeployedContract::Wallet,
            factory: params.factory,
            tx_hash: receipt.tx_hash,
        })?;

    if observed != predicted {
        return Err(OnboardingError::PredictionIntegrity {
            contract: DeployedContract::Wallet,
            predicted,
            observed,
        });
    }

    tracing::info!(target: "onboarding::safe", safe = %observed, tx_hash = %receipt.tx_hash, "safe deployed");
    Ok(SafeDeployment { address: observed, tx_hash: receipt.tx_hash, salt_nonce })
}
