use alloy_primitives::{address, b256, Address, B256};

/// Label hashed into the role key used for every onboarding run
pub const ROLE_LABEL: &str = "P2P_SUPERFORM_ROLE";

/// `keccak256(ROLE_LABEL)`
pub const ROLE_KEY: B256 =
    b256!("b7f0b598bcddbe83ba50447062bac2af62f9a2f0b78dc2ca2ea758c6d18147e8");

/// Upper bound for any basis-point value (10000 = 100%)
pub const MAX_BASIS_POINTS: u64 = 10_000;

/// Client share of deposits used when the fee endpoint cannot be consulted
pub const FALLBACK_DEPOSIT_BPS: u64 = 10_000;

/// Client share of profit used when the fee endpoint cannot be consulted
pub const FALLBACK_PROFIT_BPS: u64 = 9_700;

/// Safe threshold set at wallet setup (single owner)
pub const SAFE_THRESHOLD: u64 = 1;

/// Signature length (65 bytes: r=32, s=32, v=1)
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to a `{0, 1}` recovery id to reach the `{27, 28}` form
pub const RECOVERY_ID_OFFSET: u8 = 27;

/// Gnosis Safe Singleton v1.3.0 canonical address
pub const SAFE_SINGLETON_ADDRESS: Address = address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552");

/// Gnosis Safe Proxy Factory v1.3.0 canonical address
pub const SAFE_PROXY_FACTORY_ADDRESS: Address =
    address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2");

/// Zodiac ModuleProxyFactory canonical address (same on every supported chain)
pub const MODULE_PROXY_FACTORY_ADDRESS: Address =
    address!("000000000000aDdB49795b0f9bA5BC298cDda236");

/// Placeholder endpoint value that means "no fee service deployed yet"
pub const PLACEHOLDER_FEE_API_URL: &str = "dummy";
