//! ABI bindings for the third-party contracts driven during onboarding.
//!
//! Only the functions and events actually called or decoded are declared:
//!
//! - Safe (singleton v1.3.0 / v1.4.1 share this surface)
//! - Safe proxy factory, with both `ProxyCreation` event layouts
//! - Zodiac `ModuleProxyFactory`
//! - Zodiac Roles v2 module
//! - The yield-proxy factory that assigns per-client proxy addresses

use alloy_sol_types::sol;

sol! {
    /// Safe account surface used for setup, hashing and execution.
    interface ISafe {
        function setup(
            address[] owners,
            uint256 threshold,
            address to,
            bytes data,
            address fallbackHandler,
            address paymentToken,
            uint256 payment,
            address paymentReceiver
        ) external;

        function execTransaction(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes signatures
        ) external payable returns (bool success);

        function getTransactionHash(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            uint256 nonce
        ) external view returns (bytes32);

        function nonce() external view returns (uint256);

        function enableModule(address module) external;

        function isModuleEnabled(address module) external view returns (bool);
    }

    /// Safe proxy factory calls.
    interface ISafeProxyFactory {
        function createProxyWithNonce(address singleton, bytes initializer, uint256 saltNonce)
            external
            returns (address proxy);

        function proxyCreationCode() external pure returns (bytes);
    }

    /// `ProxyCreation` as emitted by the v1.3.0 factory (no indexed fields).
    interface ISafeProxyFactoryV130 {
        event ProxyCreation(address proxy, address singleton);
    }

    /// `ProxyCreation` as emitted by the v1.4.1 factory (proxy indexed).
    interface ISafeProxyFactoryV141 {
        event ProxyCreation(address indexed proxy, address singleton);
    }

    /// Zodiac minimal-proxy factory for modules.
    interface IModuleProxyFactory {
        function deployModule(address masterCopy, bytes initializer, uint256 saltNonce)
            external
            returns (address proxy);

        event ModuleProxyCreation(address indexed proxy, address indexed masterCopy);
    }

    /// Zodiac Roles v2 permission surface.
    interface IRoles {
        function setUp(bytes initParams) external;

        function scopeTarget(bytes32 roleKey, address targetAddress) external;

        function allowFunction(
            bytes32 roleKey,
            address targetAddress,
            bytes4 selector,
            uint8 options
        ) external;

        function assignRoles(address module, bytes32[] roleKeys, bool[] memberOf) external;

        function setDefaultRole(address module, bytes32 roleKey) external;
    }

    /// Factory that deterministically assigns a yield proxy per (client, fee split).
    interface IYieldProxyFactory {
        function predictP2pYieldProxyAddress(
            address client,
            uint48 clientBasisPointsOfDeposit,
            uint48 clientBasisPointsOfProfit
        ) external view returns (address);
    }
}
