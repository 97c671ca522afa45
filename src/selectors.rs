use alloy_primitives::{keccak256, FixedBytes};

/// Compute the Solidity function selector (first 4 bytes of keccak256(signature)).
pub fn function_selector(signature: &str) -> FixedBytes<4> {
    let hash = keccak256(signature.as_bytes());
    FixedBytes::from_slice(&hash[..4])
}

/// Yield-proxy factory deposit entry point, callable with native value.
pub const DEPOSIT_SIGNATURE: &str = "deposit(bytes,uint48,uint48,uint256,bytes)";

/// Yield-proxy withdraw entry point, never callable with native value.
pub const WITHDRAW_SIGNATURE: &str = "withdraw(bytes)";

pub fn deposit() -> FixedBytes<4> {
    function_selector(DEPOSIT_SIGNATURE)
}

pub fn withdraw() -> FixedBytes<4> {
    function_selector(WITHDRAW_SIGNATURE)
}
