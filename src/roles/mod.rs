//! Zodiac Roles module
//!
//! A Roles module proxy is deployed per Safe with the client as owner and the Safe as
//! both avatar and target. While it is not yet enabled on the Safe, its owner (the
//! onboarding account) scopes the single executor role; see [`permissions`].

pub mod permissions;

pub use permissions::{configure_permissions, configure_permissions_with, PermissionPlan, RoleCall};

use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::{SolCall, SolValue};

use crate::chain::{find_event, ChainContext, TxRequest};
use crate::contracts::{IModuleProxyFactory, IRoles};
use crate::errors::{DeployedContract, OnboardingError, ProtocolError};
use crate::nonce::NonceSequencer;
use crate::predictor::{predict_module_proxy_address, random_salt_nonce};

/// Roles v2 `ExecutionOptions`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExecutionOptions {
    /// Plain calls without value
    None = 0,
    /// Calls that may carry value
    Send = 1,
    DelegateCall = 2,
    Both = 3,
}

impl From<ExecutionOptions> for u8 {
    fn from(options: ExecutionOptions) -> Self {
        options as u8
    }
}

/// Inputs of a Roles module deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolesDeployParams {
    /// Module owner
    pub owner: Address,
    /// Safe used as avatar and target
    pub safe: Address,
    /// Roles mastercopy the proxy delegates to
    pub master_copy: Address,
    /// Zodiac module proxy factory
    pub factory: Address,
    pub salt_nonce: Option<U256>,
}

/// A confirmed Roles module deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolesDeployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub salt_nonce: U256,
}

/// `setUp(abi.encode(owner, avatar, target))`
pub fn roles_setup_initializer(owner: Address, safe: Address) -> Bytes {
    let init_params = (owner, safe, safe).abi_encode_params();
    IRoles::setUpCall { initParams: init_params.into() }.abi_encode().into()
}

/// Deploy a Roles module proxy bound to `params.safe` and confirm its address.
pub async fn deploy_roles_module(
    ctx: &ChainContext,
    nonces: &NonceSequencer,
    params: &RolesDeployParams,
) -> Result<RolesDeployment, OnboardingError> {
    let initializer = roles_setup_initializer(params.owner, params.safe);
    let salt_nonce = params.salt_nonce.unwrap_or_else(random_salt_nonce);
    let predicted = predict_module_proxy_address(params.factory, params.master_copy, &initializer, salt_nonce);
    tracing::info!(target: "onboarding::roles", safe = %params.safe, %predicted, %salt_nonce, "deploying roles module");

    let call = IModuleProxyFactory::deployModuleCall {
        masterCopy: params.master_copy,
        initializer,
        saltNonce: salt_nonce,
    };
    let receipt = ctx.submit(TxRequest::call(params.factory, &call, nonces.consume())).await?;

    let event = find_event::<IModuleProxyFactory::ModuleProxyCreation>(&receipt.logs, params.factory).ok_or(
        ProtocolError::MissingCreationEvent {
            contract: DeployedContract::RoleModule,
            factory: params.factory,
            tx_hash: receipt.tx_hash,
        },
    )?;

    if event.proxy != predicted {
        return Err(OnboardingError::PredictionIntegrity {
            contract: DeployedContract::RoleModule,
            predicted,
            observed: event.proxy,
        });
    }

    tracing::info!(target: "onboarding::roles", roles = %event.proxy, tx_hash = %receipt.tx_hash, "roles module deployed");
    Ok(RolesDeployment { address: event.proxy, tx_hash: receipt.tx_hash, salt_nonce })
}
