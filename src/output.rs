//! Colored console output for the onboarding binary.
//!
//! Color scheme: blue+bold headers, cyan values, green success,
//! red failures, dimmed secondary text.

use alloy_primitives::{Address, B256};
use colored::Colorize;

use crate::config::OnboardingConfig;
use crate::onboarding::{
    OnboardingFailure, OnboardingObserver, OnboardingResult, OnboardingState, TracingObserver,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Abbreviate a 32-byte hash as `0x1234abcd..5678ef90`.
pub fn short_hash(hash: &B256) -> String {
    let full = hash.to_string();
    format!("{}..{}", &full[..10], &full[full.len() - 8..])
}

/// Position of a state in the happy path, for `[n/total]` step prefixes.
pub fn step_number(state: OnboardingState) -> Option<u8> {
    match state {
        OnboardingState::Idle => None,
        OnboardingState::WalletDeploying => Some(1),
        OnboardingState::ModuleDeploying => Some(2),
        OnboardingState::FeePolicyResolving => Some(3),
        OnboardingState::PermissionsConfiguring(_) => Some(4),
        OnboardingState::ModuleEnabling => Some(5),
        OnboardingState::WalletDeployed
        | OnboardingState::ModuleDeployed
        | OnboardingState::ProxyAddressPredicted
        | OnboardingState::Complete => None,
    }
}

/// Number of numbered steps reported by [`step_number`]
pub const STEP_COUNT: u8 = 5;

// ── Banner & Identity ──────────────────────────────────────────────

/// Print the startup banner.
pub fn print_banner(rpc_url: &str, account: &Address, client: &Address) {
    println!();
    println!("{}", "=== Safe + Roles Onboarding ===".blue().bold());
    println!("  RPC:          {}", rpc_url.cyan());
    println!("  Signer:       {}", format!("{account}").cyan());
    println!("  Client:       {}", format!("{client}").cyan());
}

/// Print the contracts and fee policy the run will use.
pub fn print_config(config: &OnboardingConfig) {
    println!("{}", "Configuration:".blue().bold());
    println!("  Safe singleton:       {}", format!("{}", config.safe_singleton).cyan());
    println!("  Safe proxy factory:   {}", format!("{}", config.safe_proxy_factory).cyan());
    println!("  Roles mastercopy:     {}", format!("{}", config.roles_master_copy).cyan());
    println!("  Module proxy factory: {}", format!("{}", config.module_proxy_factory).cyan());
    println!("  Yield proxy factory:  {}", format!("{}", config.yield_proxy_factory).cyan());
    println!("  Executor:             {}", format!("{}", config.executor).cyan());
    match config.fee_endpoint() {
        Some(url) => println!("  Fee endpoint:         {} ({:?})", url.cyan(), config.fee_policy),
        None => println!("  Fee endpoint:         {} ({:?})", "none".dimmed(), config.fee_policy),
    }
}

// ── Progress ───────────────────────────────────────────────────────

/// Print a numbered step line when the run enters a new phase.
pub fn print_step(state: OnboardingState) {
    if let Some(n) = step_number(state) {
        let label = match state {
            OnboardingState::PermissionsConfiguring(call) => format!("Configuring permissions (call {call}/6)"),
            other => capitalize(&other.to_string()),
        };
        println!("  {} {}", format!("[{n}/{STEP_COUNT}]").dimmed(), label);
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prints progress lines and forwards everything to [`TracingObserver`].
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    tracing: TracingObserver,
}

impl OnboardingObserver for ConsoleObserver {
    fn on_transition(&self, from: OnboardingState, to: OnboardingState) {
        self.tracing.on_transition(from, to);
        print_step(to);
    }

    fn on_failure(&self, failure: &OnboardingFailure) {
        self.tracing.on_failure(failure);
    }
}

// ── Result ─────────────────────────────────────────────────────────

/// Print the result record of a completed run.
pub fn print_result(result: &OnboardingResult) {
    println!();
    println!("  {} Onboarding complete", "OK".green().bold());
    println!("  Safe:            {}", format!("{}", result.wallet_address).cyan());
    println!("  Roles module:    {}", format!("{}", result.role_module_address).cyan());
    println!("  Yield proxy:     {}", format!("{}", result.predicted_proxy_address).cyan());
    println!("  Role key:        {}", format!("{}", result.role_key).dimmed());

    let txs = &result.transactions;
    println!("{}", "Transactions:".blue().bold());
    println!("  Safe deployment:    {}", short_hash(&txs.wallet_deployment_hash));
    println!("  Module deployment:  {}", short_hash(&txs.role_module_deployment_hash));
    for (i, hash) in txs.permission_configuration_hashes.iter().enumerate() {
        println!("  Permission {}:       {}", i + 1, short_hash(hash));
    }
    println!("  Module enable:      {}", short_hash(&txs.module_enable_hash));
}

/// Print a failed run.
pub fn print_failure(failure: &OnboardingFailure) {
    println!();
    println!("  {} Onboarding failed while {}", "ERROR:".red().bold(), failure.state);
    println!("  {}", failure.cause.to_string().dimmed());
    println!(
        "  {}",
        "Nothing was rolled back; contracts created before the failure remain on-chain.".dimmed()
    );
}

// ── Tests ───────────────────────────────────────────────────────────
