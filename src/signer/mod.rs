//! Signing key loading
//!
//! The onboarding account is a single local key, supplied either as a raw hex private
//! key or as an Ethereum V3 keystore file unlocked with a password.

pub mod errors;
pub mod keystore;

pub use errors::SignerError;
pub use keystore::{decrypt_keystore, load_keystore, KeystoreFile};

use alloy_primitives::Signature;
use alloy_signer_local::PrivateKeySigner;

/// Parse a hex private key (with or without `0x`).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, SignerError> {
    private_key_hex
        .trim()
        .parse::<PrivateKeySigner>()
        .map_err(|_| SignerError::InvalidPrivateKey)
}

/// Convert a signature to bytes (r || s || v) with `v` as the raw parity bit (0 or 1).
pub fn signature_to_bytes(sig: &Signature) -> [u8; 65] {
    let mut bytes = [0u8; 65];
    bytes[..32].copy_from_slice(&sig.r().to_be_bytes::<32>());
    bytes[32..64].copy_from_slice(&sig.s().to_be_bytes::<32>());
    bytes[64] = sig.v() as u8;
    bytes
}
