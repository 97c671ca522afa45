//! Deterministic deployment address prediction.
//!
//! Both the Safe proxy factory and the Zodiac module proxy factory deploy with CREATE2
//! using the same salt derivation:
//!
//! ```text
//!   salt    = keccak256(keccak256(initializer) || uint256(saltNonce))
//!   address = keccak256(0xff || factory || salt || keccak256(initCode))[12..]
//! ```
//!
//! They differ only in the init code. Everything here is pure; the result is trusted
//! before the deployment is sent and checked against the creation event afterwards.

use alloy_primitives::{keccak256, Address, Bytes, Keccak256, B256, U256};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Minimal proxy prefix used by the Zodiac `ModuleProxyFactory`
const MODULE_PROXY_PREFIX: [u8; 19] = [
    0x60, 0x2d, 0x80, 0x60, 0x09, 0x3d, 0x39, 0x3d, 0xf3, 0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d,
    0x3d, 0x36, 0x3d, 0x73,
];

/// Minimal proxy suffix (delegatecall, return / revert)
const MODULE_PROXY_SUFFIX: [u8; 15] =
    [0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3];

/// Salt actually used on-chain for a given initializer and salt nonce.
pub fn deployment_salt(initializer: &[u8], salt_nonce: U256) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(keccak256(initializer));
    hasher.update(salt_nonce.to_be_bytes::<32>());
    hasher.finalize()
}

/// CREATE2 address for `factory`, `salt` and the hash of the init code.
pub fn create2_address(factory: Address, salt: B256, init_code_hash: B256) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update([0xff]);
    hasher.update(factory);
    hasher.update(salt);
    hasher.update(init_code_hash);
    Address::from_slice(&hasher.finalize()[12..])
}

/// Init code of a Zodiac module proxy pointing at `master_copy`.
pub fn module_proxy_init_code(master_copy: Address) -> Bytes {
    let mut code = Vec::with_capacity(MODULE_PROXY_PREFIX.len() + 20 + MODULE_PROXY_SUFFIX.len());
    code.extend_from_slice(&MODULE_PROXY_PREFIX);
    code.extend_from_slice(master_copy.as_slice());
    code.extend_from_slice(&MODULE_PROXY_SUFFIX);
    code.into()
}

/// Init code of a Safe proxy: the factory's `proxyCreationCode` followed by the
/// singleton as a 32-byte word.
pub fn safe_proxy_init_code(proxy_creation_code: &[u8], singleton: Address) -> Bytes {
    let mut code = Vec::with_capacity(proxy_creation_code.len() + 32);
    code.extend_from_slice(proxy_creation_code);
    code.extend_from_slice(singleton.into_word().as_slice());
    code.into()
}

/// Address the module proxy factory will assign to `deployModule(master_copy, initializer, salt_nonce)`.
pub fn predict_module_proxy_address(
    factory: Address,
    master_copy: Address,
    initializer: &[u8],
    salt_nonce: U256,
) -> Address {
    let salt = deployment_salt(initializer, salt_nonce);
    create2_address(factory, salt, keccak256(module_proxy_init_code(master_copy)))
}

/// Address the Safe proxy factory will assign to
/// `createProxyWithNonce(singleton, initializer, salt_nonce)`.
pub fn predict_safe_address(
    factory: Address,
    proxy_creation_code: &[u8],
    singleton: Address,
    initializer: &[u8],
    salt_nonce: U256,
) -> Address {
    let salt = deployment_salt(initializer, salt_nonce);
    create2_address(factory, salt, keccak256(safe_proxy_init_code(proxy_creation_code, singleton)))
}

/// Fresh salt nonce: unix milliseconds in the high bits, a random component in the low 32.
///
/// Keeps unrelated deployments started in the same millisecond from colliding.
pub fn random_salt_nonce() -> U256 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let jitter: u64 = rand::thread_rng().gen_range(0..1_000_000);
    (U256::from(millis) << 32usize) | U256::from(jitter)
}
