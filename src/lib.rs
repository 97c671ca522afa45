//! # Safe + Roles onboarding
//!
//! Provisions a Safe wallet for a client on an EVM chain and locks it down with a
//! Zodiac Roles module, so that a single automation executor may only deposit through
//! the yield-proxy factory and withdraw from the client's own yield proxy.
//!
//! Entry point: [`onboarding::OnboardingClient`].

pub mod chain;
pub mod cli;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod errors;
pub mod fees;
pub mod nonce;
pub mod onboarding;
pub mod output;
pub mod predictor;
pub mod roles;
pub mod safe;
pub mod selectors;
pub mod signer;

#[cfg(test)]
pub(crate) mod testing;
