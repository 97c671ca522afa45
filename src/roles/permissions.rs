//! Executor role scoping
//!
//! The executor may only:
//!
//! 1. call `deposit` on the yield-proxy factory, with value
//! 2. call `withdraw` on the client's predicted yield proxy, without value
//!
//! This takes six Roles calls, sent strictly in order. A failure stops the sequence;
//! rules already applied stay applied.

use alloy_primitives::{Address, Bytes, FixedBytes, TxHash, B256};
use alloy_sol_types::SolCall;

use super::ExecutionOptions;
use crate::chain::{ChainContext, TxRequest};
use crate::contracts::IRoles;
use crate::errors::OnboardingError;
use crate::nonce::NonceSequencer;

/// Number of calls issued by [`configure_permissions`]
pub const PERMISSION_CALL_COUNT: usize = 6;

/// Everything needed to scope the executor role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionPlan {
    pub role_key: B256,
    /// Account that receives the role
    pub executor: Address,
    /// Yield-proxy factory (deposit target)
    pub yield_factory: Address,
    pub deposit_selector: FixedBytes<4>,
    /// The client's predicted yield proxy (withdraw target)
    pub yield_proxy: Address,
    pub withdraw_selector: FixedBytes<4>,
}

/// One Roles call of the permission sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCall {
    ScopeTarget { role_key: B256, target: Address },
    AllowFunction { role_key: B256, target: Address, selector: FixedBytes<4>, options: ExecutionOptions },
    AssignRoles { member: Address, role_key: B256 },
    SetDefaultRole { member: Address, role_key: B256 },
}

impl RoleCall {
    pub fn calldata(&self) -> Bytes {
        match *self {
            Self::ScopeTarget { role_key, target } => {
                IRoles::scopeTargetCall { roleKey: role_key, targetAddress: target }.abi_encode()
            }
            Self::AllowFunction { role_key, target, selector, options } => IRoles::allowFunctionCall {
                roleKey: role_key,
                targetAddress: target,
                selector,
                options: options.into(),
            }
            .abi_encode(),
            Self::AssignRoles { member, role_key } => IRoles::assignRolesCall {
                module: member,
                roleKeys: vec![role_key],
                memberOf: vec![true],
            }
            .abi_encode(),
            Self::SetDefaultRole { member, role_key } => {
                IRoles::setDefaultRoleCall { module: member, roleKey: role_key }.abi_encode()
            }
        }
        .into()
    }

    fn name(&self) -> &'static str {
        match self {
            Self::ScopeTarget { .. } => "scopeTarget",
            Self::AllowFunction { .. } => "allowFunction",
            Self::AssignRoles { .. } => "assignRoles",
            Self::SetDefaultRole { .. } => "setDefaultRole",
        }
    }
}

impl PermissionPlan {
    /// The six calls, in submission order.
    pub fn calls(&self) -> [RoleCall; PERMISSION_CALL_COUNT] {
        let role_key = self.role_key;
        [
            RoleCall::ScopeTarget { role_key, target: self.yield_factory },
            RoleCall::AllowFunction {
                role_key,
                target: self.yield_factory,
                selector: self.deposit_selector,
                options: ExecutionOptions::Send,
            },
            RoleCall::ScopeTarget { role_key, target: self.yield_proxy },
            RoleCall::AllowFunction {
                role_key,
                target: self.yield_proxy,
                selector: self.withdraw_selector,
                options: ExecutionOptions::None,
            },
            RoleCall::AssignRoles { member: self.executor, role_key },
            RoleCall::SetDefaultRole { member: self.executor, role_key },
        ]
    }
}

/// Apply `plan` to the Roles module at `roles`, returning the six transaction hashes.
pub async fn configure_permissions(
    ctx: &ChainContext,
    nonces: &NonceSequencer,
    roles: Address,
    plan: &PermissionPlan,
) -> Result<Vec<TxHash>, OnboardingError> {
    configure_permissions_with(ctx, nonces, roles, plan, |_| {}).await
}

/// Like [`configure_permissions`], calling `on_step(n)` (1-based) before call `n` is sent.
pub async fn configure_permissions_with<F>(
    ctx: &ChainContext,
    nonces: &NonceSequencer,
    roles: Address,
    plan: &PermissionPlan,
    mut on_step: F,
) -> Result<Vec<TxHash>, OnboardingError>
where
    F: FnMut(u8) + Send,
{
    let mut hashes = Vec::with_capacity(PERMISSION_CALL_COUNT);

    for (index, call) in plan.calls().iter().enumerate() {
        let step = index as u8 + 1;
        on_step(step);

        let tx = TxRequest { to: roles, value: Default::default(), data: call.calldata(), nonce: nonces.consume() };
        let receipt = ctx.submit(tx).await?;
        tracing::info!(target: "onboarding::roles", step, call = call.name(), tx_hash = %receipt.tx_hash, "permission applied");
        hashes.push(receipt.tx_hash);
    }

    Ok(hashes)
}
