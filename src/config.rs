//! Onboarding configuration.
//!
//! Built by the CLI from flags and environment variables, or directly by library
//! callers. [`OnboardingConfig::validate`] runs before any chain interaction.

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::constants::{
    MODULE_PROXY_FACTORY_ADDRESS, PLACEHOLDER_FEE_API_URL, SAFE_PROXY_FACTORY_ADDRESS, SAFE_SINGLETON_ADDRESS,
};
use crate::fees::FeeFallbackPolicy;

/// Invalid or incomplete configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required contract or account address is unset (zero)
    #[error("{0} address is not configured")]
    MissingAddress(&'static str),

    /// The fee endpoint is not an absolute http(s) URL
    #[error("invalid fee endpoint {url}: {reason}")]
    InvalidFeeEndpoint {
        /// Configured value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The strict fee policy needs an endpoint to query
    #[error("fee policy is strict but no fee endpoint is configured")]
    FeeEndpointRequired,

    /// Neither a private key nor a keystore was supplied
    #[error("no signing key: set a private key or a keystore")]
    MissingSigner,

    /// The connected node serves a different chain than configured
    #[error("connected to chain {actual}, expected {expected}")]
    ChainIdMismatch {
        /// Configured chain id
        expected: u64,
        /// Chain id reported by the node
        actual: u64,
    },
}

/// Addresses and policies of one onboarding deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingConfig {
    /// Safe singleton (mastercopy)
    pub safe_singleton: Address,
    /// Safe proxy factory
    pub safe_proxy_factory: Address,
    /// Zodiac Roles v2 mastercopy
    pub roles_master_copy: Address,
    /// Zodiac module proxy factory
    pub module_proxy_factory: Address,
    /// Factory that assigns yield proxies; also the deposit target
    pub yield_proxy_factory: Address,
    /// Automation account granted the executor role
    pub executor: Address,
    /// Fee endpoint; `None`, empty or `dummy` mean "not deployed"
    pub fee_api_url: Option<String>,
    /// Bearer token for the fee endpoint
    pub fee_api_token: Option<String>,
    pub fee_policy: FeeFallbackPolicy,
    /// Expected chain id, checked against the node when set
    pub chain_id: Option<u64>,
    pub safe_salt_nonce: Option<U256>,
    pub roles_salt_nonce: Option<U256>,
}

impl OnboardingConfig {
    /// Configuration with the canonical Safe v1.3.0 and Zodiac factory deployments.
    pub fn new(roles_master_copy: Address, yield_proxy_factory: Address, executor: Address) -> Self {
        Self {
            safe_singleton: SAFE_SINGLETON_ADDRESS,
            safe_proxy_factory: SAFE_PROXY_FACTORY_ADDRESS,
            roles_master_copy,
            module_proxy_factory: MODULE_PROXY_FACTORY_ADDRESS,
            yield_proxy_factory,
            executor,
            fee_api_url: None,
            fee_api_token: None,
            fee_policy: FeeFallbackPolicy::default(),
            chain_id: None,
            safe_salt_nonce: None,
            roles_salt_nonce: None,
        }
    }

    /// The fee endpoint if one is actually configured.
    pub fn fee_endpoint(&self) -> Option<&str> {
        self.fee_api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != PLACEHOLDER_FEE_API_URL)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("safe singleton", self.safe_singleton),
            ("safe proxy factory", self.safe_proxy_factory),
            ("roles master copy", self.roles_master_copy),
            ("module proxy factory", self.module_proxy_factory),
            ("yield proxy factory", self.yield_proxy_factory),
            ("executor", self.executor),
        ];
        if let Some(&(name, _)) = required.iter().find(|(_, address)| address.is_zero()) {
            return Err(ConfigError::MissingAddress(name));
        }

        match self.fee_endpoint() {
            Some(url) => validate_http_url(url)?,
            None if self.fee_policy == FeeFallbackPolicy::Strict => {
                return Err(ConfigError::FeeEndpointRequired)
            }
            None => {}
        }

        Ok(())
    }
}

fn validate_http_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFeeEndpoint { url: url.to_string(), reason };
    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}
