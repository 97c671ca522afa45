//! Client onboarding pipeline
//!
//! One run provisions, strictly in order:
//!
//! 1. a Safe owned by the client
//! 2. a Roles module bound to that Safe
//! 3. the client's fee split and, from it, the client's yield-proxy address
//! 4. the six executor permissions on the Roles module
//! 5. the Roles module enabled on the Safe, through a Safe transaction
//!
//! Every transaction comes from the same account with nonces from one
//! [`NonceSequencer`]. Nothing is undone when a step fails.

pub mod observer;
pub mod result;
pub mod state;

pub use observer::{NoopObserver, OnboardingObserver, TracingObserver};
pub use result::{OnboardingResult, TransactionHashes};
pub use state::{OnboardingFailure, OnboardingState};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use std::sync::Arc;

use crate::chain::ChainContext;
use crate::config::{ConfigError, OnboardingConfig};
use crate::constants::ROLE_KEY;
use crate::contracts::ISafe;
use crate::errors::OnboardingError;
use crate::fees::{predict_yield_proxy_address, FeeConfigSource, FeeError, FeePolicyResolver};
use crate::nonce::NonceSequencer;
use crate::roles::{configure_permissions_with, deploy_roles_module, PermissionPlan, RolesDeployParams};
use crate::safe::{deploy_safe, execute_transaction, prepare_transaction, Operation, SafeDeployParams};
use crate::selectors;

/// Runs onboardings against one network with one signing account.
pub struct OnboardingClient {
    ctx: ChainContext,
    config: OnboardingConfig,
    fees: FeePolicyResolver,
    observer: Arc<dyn OnboardingObserver>,
}

impl std::fmt::Debug for OnboardingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnboardingClient")
            .field("ctx", &self.ctx)
            .field("config", &self.config)
            .field("fees", &self.fees)
            .finish_non_exhaustive()
    }
}

/// Current state of a run, reported to the observer on every change
struct Progress<'a> {
    state: OnboardingState,
    observer: &'a dyn OnboardingObserver,
}

impl Progress<'_> {
    fn enter(&mut self, next: OnboardingState) {
        self.observer.on_transition(self.state, next);
        self.state = next;
    }
}

impl OnboardingClient {
    /// Fails only when the HTTP client for the fee endpoint cannot be built.
    pub fn new(ctx: ChainContext, config: OnboardingConfig) -> Result<Self, FeeError> {
        let fees =
            FeePolicyResolver::new(config.fee_api_url.clone(), config.fee_api_token.clone(), config.fee_policy)?;
        Ok(Self { ctx, config, fees, observer: Arc::new(NoopObserver) })
    }

    /// Take fee splits from `source` instead of the fee endpoint.
    pub fn with_fee_source(mut self, source: Arc<dyn FeeConfigSource>) -> Self {
        self.fees = self.fees.with_override(source);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn OnboardingObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &OnboardingConfig {
        &self.config
    }

    /// Onboard `client`, or the signing account itself when `None`.
    ///
    /// The client owns the Safe and the Roles module, so it has to be the signing
    /// account for the permission and enable steps to pass on-chain.
    pub async fn onboard_client(&self, client: Option<Address>) -> Result<OnboardingResult, OnboardingFailure> {
        let mut progress = Progress { state: OnboardingState::Idle, observer: self.observer.as_ref() };

        match self.run(&mut progress, client).await {
            Ok(result) => Ok(result),
            Err(cause) => {
                let failure = OnboardingFailure { state: progress.state, cause };
                self.observer.on_failure(&failure);
                Err(failure)
            }
        }
    }

    async fn run(
        &self,
        progress: &mut Progress<'_>,
        client: Option<Address>,
    ) -> Result<OnboardingResult, OnboardingError> {
        self.config.validate()?;
        if let Some(expected) = self.config.chain_id {
            let actual = self.ctx.reader().chain_id().await?;
            if actual != expected {
                return Err(ConfigError::ChainIdMismatch { expected, actual }.into());
            }
        }

        let client = client.unwrap_or_else(|| self.ctx.account());
        tracing::info!(target: "onboarding", %client, account = %self.ctx.account(), "onboarding client");
        let nonces = NonceSequencer::from_chain(self.ctx.reader(), self.ctx.account()).await?;

        progress.enter(OnboardingState::WalletDeploying);
        let wallet = deploy_safe(
            &self.ctx,
            &nonces,
            &SafeDeployParams {
                owner: client,
                singleton: self.config.safe_singleton,
                factory: self.config.safe_proxy_factory,
                salt_nonce: self.config.safe_salt_nonce,
            },
        )
        .await?;
        progress.enter(OnboardingState::WalletDeployed);

        progress.enter(OnboardingState::ModuleDeploying);
        let module = deploy_roles_module(
            &self.ctx,
            &nonces,
            &RolesDeployParams {
                owner: client,
                safe: wallet.address,
                master_copy: self.config.roles_master_copy,
                factory: self.config.module_proxy_factory,
                salt_nonce: self.config.roles_salt_nonce,
            },
        )
        .await?;
        progress.enter(OnboardingState::ModuleDeployed);

        progress.enter(OnboardingState::FeePolicyResolving);
        let fee = self.fees.resolve(client).await?;
        tracing::info!(target: "onboarding", %fee, "fee split resolved");
        let yield_proxy =
            predict_yield_proxy_address(&self.ctx, self.config.yield_proxy_factory, wallet.address, &fee).await?;
        progress.enter(OnboardingState::ProxyAddressPredicted);

        let plan = PermissionPlan {
            role_key: ROLE_KEY,
            executor: self.config.executor,
            yield_factory: self.config.yield_proxy_factory,
            deposit_selector: selectors::deposit(),
            yield_proxy,
            withdraw_selector: selectors::withdraw(),
        };
        let permission_hashes = configure_permissions_with(&self.ctx, &nonces, module.address, &plan, |step| {
            progress.enter(OnboardingState::PermissionsConfiguring(step))
        })
        .await?;

        progress.enter(OnboardingState::ModuleEnabling);
        let enable = ISafe::enableModuleCall { module: module.address }.abi_encode();
        let pending =
            prepare_transaction(&self.ctx, wallet.address, wallet.address, enable.into(), U256::ZERO, Operation::Call)
                .await?;
        let enable_hash = execute_transaction(&self.ctx, &nonces, wallet.address, &pending).await?;
        progress.enter(OnboardingState::Complete);

        Ok(OnboardingResult {
            wallet_address: wallet.address,
            role_module_address: module.address,
            predicted_proxy_address: yield_proxy,
            role_key: ROLE_KEY,
            transactions: TransactionHashes {
                wallet_deployment_hash: wallet.tx_hash,
                role_module_deployment_hash: module.tx_hash,
                module_enable_hash: enable_hash,
                permission_configuration_hashes: permission_hashes,
            },
        })
    }
}
