use std::fmt;
use thiserror::Error;

use crate::errors::{ErrorKind, OnboardingError};

/// Progress of one onboarding run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingState {
    Idle,
    WalletDeploying,
    WalletDeployed,
    ModuleDeploying,
    ModuleDeployed,
    FeePolicyResolving,
    ProxyAddressPredicted,
    /// Sending permission call `n` of 6
    PermissionsConfiguring(u8),
    ModuleEnabling,
    Complete,
}

impl fmt::Display for OnboardingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::WalletDeploying => f.write_str("wallet deploying"),
            Self::WalletDeployed => f.write_str("wallet deployed"),
            Self::ModuleDeploying => f.write_str("role module deploying"),
            Self::ModuleDeployed => f.write_str("role module deployed"),
            Self::FeePolicyResolving => f.write_str("fee policy resolving"),
            Self::ProxyAddressPredicted => f.write_str("proxy address predicted"),
            Self::PermissionsConfiguring(step) => write!(f, "permissions configuring ({step}/6)"),
            Self::ModuleEnabling => f.write_str("role module enabling"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// A run that stopped before completion.
///
/// Earlier steps are not rolled back; `state` tells how far the run got.
#[derive(Debug, Error)]
#[error("onboarding failed while {state}: {cause}")]
pub struct OnboardingFailure {
    /// State the run was in when the error occurred
    pub state: OnboardingState,
    #[source]
    pub cause: OnboardingError,
}

impl OnboardingFailure {
    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }
}
