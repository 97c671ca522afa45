use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use eyre::WrapErr;
use std::path::PathBuf;

use crate::config::{ConfigError, OnboardingConfig};
use crate::constants::{MODULE_PROXY_FACTORY_ADDRESS, SAFE_PROXY_FACTORY_ADDRESS, SAFE_SINGLETON_ADDRESS};
use crate::fees::FeeFallbackPolicy;
use crate::signer;

/// CLI arguments for one onboarding run
#[derive(Parser, Debug)]
#[command(name = "onboard", about = "Provision a Safe with a Roles-scoped executor for a client")]
pub struct Cli {
    /// JSON-RPC endpoint of the target chain
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Expected chain id; the run aborts if the node reports a different one
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Signing key (hex, with or without 0x prefix).
    /// Takes precedence over --keystore.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Encrypted V3 keystore holding the signing key
    #[arg(long, env = "KEYSTORE")]
    pub keystore: Option<PathBuf>,

    /// Password for --keystore
    #[arg(long, env = "KEYSTORE_PASSWORD", hide_env_values = true)]
    pub keystore_password: Option<String>,

    /// Client to onboard. Defaults to the signing account.
    #[arg(long, env = "CLIENT_ADDRESS")]
    pub client: Option<Address>,

    /// Automation account that receives the executor role
    #[arg(long, env = "EXECUTOR_ADDRESS")]
    pub executor: Address,

    /// Yield-proxy factory (deposit target and proxy address oracle)
    #[arg(long, env = "YIELD_PROXY_FACTORY_ADDRESS")]
    pub yield_proxy_factory: Address,

    /// Zodiac Roles v2 mastercopy
    #[arg(long, env = "ROLES_MASTER_COPY_ADDRESS")]
    pub roles_master_copy: Address,

    /// Safe singleton (defaults to the canonical v1.3.0 deployment)
    #[arg(long, env = "SAFE_SINGLETON_ADDRESS", default_value_t = SAFE_SINGLETON_ADDRESS)]
    pub safe_singleton: Address,

    /// Safe proxy factory (defaults to the canonical v1.3.0 deployment)
    #[arg(long, env = "SAFE_PROXY_FACTORY_ADDRESS", default_value_t = SAFE_PROXY_FACTORY_ADDRESS)]
    pub safe_proxy_factory: Address,

    /// Zodiac module proxy factory
    #[arg(long, env = "MODULE_PROXY_FACTORY_ADDRESS", default_value_t = MODULE_PROXY_FACTORY_ADDRESS)]
    pub module_proxy_factory: Address,

    /// Fee endpoint queried with `?client=<address>`.
    ///
    /// Leave unset (or set to "dummy") while no fee service is deployed.
    #[arg(long, env = "FEE_API_URL")]
    pub fee_api_url: Option<String>,

    /// Bearer token for the fee endpoint
    #[arg(long, env = "FEE_API_TOKEN", hide_env_values = true)]
    pub fee_api_token: Option<String>,

    /// What to do when the fee endpoint is missing or fails
    #[arg(long, env = "FEE_POLICY", value_enum, default_value_t = FeeFallbackPolicy::Fallback)]
    pub fee_policy: FeeFallbackPolicy,

    /// CREATE2 salt nonce for the Safe (decimal or 0x hex). Random when unset.
    #[arg(long, env = "SAFE_SALT_NONCE")]
    pub safe_salt_nonce: Option<U256>,

    /// CREATE2 salt nonce for the Roles module (decimal or 0x hex). Random when unset.
    #[arg(long, env = "ROLES_SALT_NONCE")]
    pub roles_salt_nonce: Option<U256>,

    /// Print only the result record as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Enable structured JSON logging instead of human-readable output.
    ///
    /// When enabled, all log output is emitted as newline-delimited JSON on stderr.
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Onboarding configuration described by the arguments. Not yet validated.
    pub fn onboarding_config(&self) -> OnboardingConfig {
        OnboardingConfig {
            safe_singleton: self.safe_singleton,
            safe_proxy_factory: self.safe_proxy_factory,
            roles_master_copy: self.roles_master_copy,
            module_proxy_factory: self.module_proxy_factory,
            yield_proxy_factory: self.yield_proxy_factory,
            executor: self.executor,
            fee_api_url: self.fee_api_url.clone(),
            fee_api_token: self.fee_api_token.clone(),
            fee_policy: self.fee_policy,
            chain_id: self.chain_id,
            safe_salt_nonce: self.safe_salt_nonce,
            roles_salt_nonce: self.roles_salt_nonce,
        }
    }

    /// Load the signing key from --private-key or --keystore.
    pub fn load_signer(&self) -> eyre::Result<PrivateKeySigner> {
        if let Some(key) = &self.private_key {
            return Ok(signer::signer_from_hex(key)?);
        }

        let Some(path) = &self.keystore else {
            return Err(ConfigError::MissingSigner.into());
        };
        let password = self
            .keystore_password
            .as_deref()
            .ok_or_else(|| eyre::eyre!("--keystore-password (KEYSTORE_PASSWORD) is required with --keystore"))?;
        signer::load_keystore(path, password).wrap_err_with(|| format!("failed to unlock {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn parse(extra: &[&str]) -> Cli {
        let mut args = vec![
            "onboard",
            "--rpc-url",
            "http://localhost:8545",
            "--executor",
            "0x00000000000000000000000000000000000000e7",
            "--yield-proxy-factory",
            "0x00000000000000000000000000000000000000f4",
            "--roles-master-copy",
            "0x9646fDAD06d3e24444381f44362a3B0eB343D337",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        let config = cli.onboarding_config();
        assert_eq!(config.safe_singleton, SAFE_SINGLETON_ADDRESS);
        assert_eq!(config.safe_proxy_factory, SAFE_PROXY_FACTORY_ADDRESS);
        assert_eq!(config.module_proxy_factory, MODULE_PROXY_FACTORY_ADDRESS);
        assert_eq!(config.fee_policy, FeeFallbackPolicy::Fallback);
        assert_eq!(config.safe_salt_nonce, None);
        assert!(config.validate().is_ok());
        assert!(!cli.json);
    }

    #[test]
    fn test_policy_and_salt_nonces() {
        let cli = parse(&[
            "--fee-policy",
            "strict",
            "--fee-api-url",
            "https://fees.example.com",
            "--safe-salt-nonce",
            "42",
            "--roles-salt-nonce",
            "0x2a",
        ]);
        let config = cli.onboarding_config();
        assert_eq!(config.fee_policy, FeeFallbackPolicy::Strict);
        assert_eq!(config.safe_salt_nonce, Some(U256::from(42)));
        assert_eq!(config.roles_salt_nonce, Some(U256::from(42)));
    }

    #[test]
    fn test_missing_required_address() {
        assert!(Cli::try_parse_from(["onboard", "--rpc-url", "http://localhost:8545"]).is_err());
    }

    #[test]
    fn test_load_signer_from_private_key() {
        let cli = parse(&["--private-key", TEST_KEY]);
        let signer = cli.load_signer().unwrap();
        assert_eq!(signer.address(), TEST_KEY.parse::<PrivateKeySigner>().unwrap().address());
    }

    #[test]
    fn test_load_signer_requires_a_source() {
        let mut cli = parse(&[]);
        cli.private_key = None;
        cli.keystore = None;
        let err = cli.load_signer().unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::MissingSigner));
    }

    #[test]
    fn test_keystore_requires_password() {
        let mut cli = parse(&["--keystore", "/tmp/keystore.json"]);
        cli.private_key = None;
        cli.keystore_password = None;
        assert!(cli.load_signer().is_err());
    }
}
