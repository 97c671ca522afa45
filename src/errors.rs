use alloy_primitives::{Address, TxHash};
use std::fmt;
use thiserror::Error;

use crate::chain::ChainError;
use crate::config::ConfigError;
use crate::fees::FeeError;

/// Contracts whose deployment address is predicted before the deployment is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployedContract {
    /// The Safe proxy
    Wallet,
    /// The Roles module proxy
    RoleModule,
}

impl fmt::Display for DeployedContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallet => f.write_str("wallet"),
            Self::RoleModule => f.write_str("role module"),
        }
    }
}

/// Malformed or unexpected data at a protocol boundary. Never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The deployment succeeded but the factory did not emit a decodable creation event
    #[error("no {contract} creation event from factory {factory} in receipt of {tx_hash}")]
    MissingCreationEvent {
        /// Which deployment was being confirmed
        contract: DeployedContract,
        /// Factory expected to emit the event
        factory: Address,
        /// Deployment transaction
        tx_hash: TxHash,
    },

    /// A signature that is not exactly 65 bytes
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// A recovery id outside {27, 28} after normalization
    #[error("invalid recovery id: expected 27 or 28, got {0}")]
    InvalidRecoveryId(u8),

    /// Fee basis points above 10000
    #[error("basis points must be <= 10000 (deposit={deposit}, profit={profit})")]
    BasisPointsOutOfRange {
        /// Client share of deposits
        deposit: u64,
        /// Client share of profit
        profit: u64,
    },

    /// A contract read returned data that does not match its ABI
    #[error("cannot decode return data of {function}: {reason}")]
    UndecodableReturn {
        /// Called function
        function: &'static str,
        /// Decoder message
        reason: String,
    },
}

/// Error classes of a provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid address or credential
    Configuration,
    /// Observed creation address differs from the prediction
    PredictionIntegrity,
    /// Fee-policy endpoint failure under the strict policy
    RemoteDependency,
    /// Malformed signature, missing event, out-of-range value
    Protocol,
    /// RPC failure, reverted or dropped transaction
    Chain,
}

/// Any error that aborts an onboarding run
#[derive(Debug, Error)]
pub enum OnboardingError {
    /// Invalid configuration, raised before any chain interaction
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Predicted and observed creation addresses disagree
    #[error("{contract} predicted at {predicted} but created at {observed}")]
    PredictionIntegrity {
        /// Which deployment
        contract: DeployedContract,
        /// Address computed before the deployment was sent
        predicted: Address,
        /// Address decoded from the creation event
        observed: Address,
    },

    /// Fee policy could not be resolved
    #[error("fee policy error: {0}")]
    FeePolicy(#[from] FeeError),

    /// Protocol violation
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Chain transport or execution failure
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

impl OnboardingError {
    /// Classify the error into the provisioning taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::PredictionIntegrity { .. } => ErrorKind::PredictionIntegrity,
            Self::FeePolicy(FeeError::MissingEndpoint) => ErrorKind::Configuration,
            Self::FeePolicy(_) => ErrorKind::RemoteDependency,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Chain(_) => ErrorKind::Chain,
        }
    }
}
