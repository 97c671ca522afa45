//! Client fee policy
//!
//! The fee split decides which yield proxy the client gets: the yield-proxy factory
//! derives the proxy address from `(client, deposit_bps, profit_bps)`. The split comes
//! from, in order of precedence:
//!
//! 1. a caller-supplied [`FeeConfigSource`]
//! 2. the remote fee endpoint ([`FeePolicyResolver`])
//! 3. the built-in fallback split, when [`FeeFallbackPolicy::Fallback`] allows it

pub mod errors;
pub mod resolver;

pub use errors::FeeError;
pub use resolver::FeePolicyResolver;

use alloy_primitives::aliases::U48;
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain::ChainContext;
use crate::constants::{FALLBACK_DEPOSIT_BPS, FALLBACK_PROFIT_BPS, MAX_BASIS_POINTS};
use crate::contracts::IYieldProxyFactory;
use crate::errors::{OnboardingError, ProtocolError};

/// Client share of deposits and of profit, in basis points (10000 = 100%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(rename = "clientBasisPointsOfDeposit")]
    pub deposit_bps: u64,
    #[serde(rename = "clientBasisPointsOfProfit")]
    pub profit_bps: u64,
}

impl FeeConfig {
    pub const fn new(deposit_bps: u64, profit_bps: u64) -> Self {
        Self { deposit_bps, profit_bps }
    }

    /// Split used when the fee endpoint is absent or unusable.
    pub const fn fallback() -> Self {
        Self::new(FALLBACK_DEPOSIT_BPS, FALLBACK_PROFIT_BPS)
    }

    /// Reject any value above 10000.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.deposit_bps > MAX_BASIS_POINTS || self.profit_bps > MAX_BASIS_POINTS {
            return Err(ProtocolError::BasisPointsOutOfRange {
                deposit: self.deposit_bps,
                profit: self.profit_bps,
            });
        }
        Ok(())
    }
}

impl fmt::Display for FeeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deposit={}bps profit={}bps", self.deposit_bps, self.profit_bps)
    }
}

/// What to do when the fee endpoint cannot be consulted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FeeFallbackPolicy {
    /// Substitute [`FeeConfig::fallback`] and keep going
    #[default]
    Fallback,
    /// Abort the run
    Strict,
}

/// Anything that can produce a fee split for a client.
#[async_trait]
pub trait FeeConfigSource: Send + Sync {
    async fn fee_config(&self, client: Address) -> Result<FeeConfig, FeeError>;
}

/// A fixed split for every client.
#[async_trait]
impl FeeConfigSource for FeeConfig {
    async fn fee_config(&self, _client: Address) -> Result<FeeConfig, FeeError> {
        Ok(*self)
    }
}

/// Ask the yield-proxy factory which proxy address `client` will get for `fee`.
///
/// Out-of-range basis points are rejected before the factory is called.
pub async fn predict_yield_proxy_address(
    ctx: &ChainContext,
    factory: Address,
    client: Address,
    fee: &FeeConfig,
) -> Result<Address, OnboardingError> {
    fee.validate()?;

    let proxy = ctx.read(factory, &prediction_call(client, fee)).await?;
    tracing::debug!(target: "onboarding::fees", %client, %fee, %proxy, "yield proxy predicted");
    Ok(proxy)
}

/// `uint48` arguments; only called once `fee` is within `MAX_BASIS_POINTS`, so nothing truncates.
fn prediction_call(client: Address, fee: &FeeConfig) -> IYieldProxyFactory::predictP2pYieldProxyAddressCall {
    IYieldProxyFactory::predictP2pYieldProxyAddressCall {
        client,
        clientBasisPointsOfDeposit: U48::from(fee.deposit_bps),
        clientBasisPointsOfProfit: U48::from(fee.profit_bps),
    }
}
