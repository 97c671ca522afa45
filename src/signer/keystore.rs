//! Ethereum V3 keystore unlocking.
//!
//! Supports the format written by geth, Reth and Foundry: PBKDF2-HMAC-SHA256 key
//! derivation, AES-128-CTR encryption and a keccak256 MAC over
//! `derived_key[16..32] || ciphertext`.

use aes::cipher::{KeyIvInit, StreamCipher};
use alloy_primitives::keccak256;
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::errors::SignerError;

/// AES-128-CTR cipher type alias
type Aes128Ctr = ctr::Ctr64BE<aes::Aes128>;

/// Keystore V3 document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    /// Account address (hex, without 0x prefix)
    #[serde(default)]
    pub address: String,
    pub crypto: CryptoJson,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoJson {
    pub cipher: String,
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub mac: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    pub dklen: u32,
    pub c: u32,
    pub prf: String,
    pub salt: String,
}

/// Read a keystore file and unlock it with `password`.
pub fn load_keystore(path: impl AsRef<Path>, password: &str) -> Result<PrivateKeySigner, SignerError> {
    let path = path.as_ref();
    let unreadable = |reason: String| SignerError::KeystoreUnreadable {
        path: path.display().to_string(),
        reason,
    };

    let data = fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
    let keystore: KeystoreFile = serde_json::from_str(&data).map_err(|e| unreadable(e.to_string()))?;
    decrypt_keystore(&keystore, password)
}

/// Unlock a parsed keystore. The MAC is verified before decryption.
pub fn decrypt_keystore(keystore: &KeystoreFile, password: &str) -> Result<PrivateKeySigner, SignerError> {
    let crypto = &keystore.crypto;
    if keystore.version != 3 {
        return Err(SignerError::UnsupportedKeystore(format!("version {}", keystore.version)));
    }
    if crypto.cipher != "aes-128-ctr" {
        return Err(SignerError::UnsupportedKeystore(format!("cipher {}", crypto.cipher)));
    }
    if crypto.kdf != "pbkdf2" || crypto.kdfparams.prf != "hmac-sha256" {
        return Err(SignerError::UnsupportedKeystore(format!(
            "kdf {} ({})",
            crypto.kdf, crypto.kdfparams.prf
        )));
    }
    if crypto.kdfparams.dklen < 32 {
        return Err(SignerError::UnsupportedKeystore(format!("dklen {}", crypto.kdfparams.dklen)));
    }

    let salt = decode_field("salt", &crypto.kdfparams.salt)?;
    let iv = decode_field("iv", &crypto.cipherparams.iv)?;
    let ciphertext = decode_field("ciphertext", &crypto.ciphertext)?;
    let expected_mac = decode_field("mac", &crypto.mac)?;
    if iv.len() != 16 || ciphertext.len() != 32 {
        return Err(SignerError::UnsupportedKeystore("malformed iv or ciphertext".into()));
    }

    let mut derived_key = vec![0u8; crypto.kdfparams.dklen as usize];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(
        password.as_bytes(),
        &salt,
        crypto.kdfparams.c,
        &mut derived_key,
    );

    let mut mac_input = Vec::with_capacity(16 + ciphertext.len());
    mac_input.extend_from_slice(&derived_key[16..32]);
    mac_input.extend_from_slice(&ciphertext);
    if keccak256(&mac_input).as_slice() != expected_mac.as_slice() {
        return Err(SignerError::MacMismatch);
    }

    let mut plaintext = ciphertext;
    let mut cipher = Aes128Ctr::new(derived_key[..16].into(), iv.as_slice().into());
    cipher.apply_keystream(&mut plaintext);

    PrivateKeySigner::from_slice(&plaintext).map_err(|_| SignerError::InvalidPrivateKey)
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, SignerError> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| SignerError::UnsupportedKeystore(format!("invalid {name} hex: {e}")))
}
