//! InfraLink device-access core.
//!
//! Domain logic for pay-per-second access to physical devices controlled by
//! on-chain contracts: fee valuation, payment authorization, unit conversion,
//! and a per-account recent-device registry.
//!
//! # Model
//!
//! - A **device contract** bills one exclusive session at a time at
//!   `feePerSecond`, payable in an ERC-20 token or the chain's native currency.
//! - A separate **info registry contract** holds per-device whitelists
//!   (overridden, often zero, fees) and user profiles.
//! - This crate never originates device or whitelist state; it derives
//!   decisions from immutable chain snapshots and caches a small list of
//!   recently connected devices.
//!
//! # Quick example
//!
//! ```
//! use alloy::primitives::U256;
//! use infralink::{authorization, valuation, PaymentMethod};
//!
//! let fee = U256::from(1000u64);
//! let cost = valuation::total_cost(600, fee);
//! assert_eq!(cost, U256::from(600_000u64));
//!
//! // ERC-20 payment with no allowance granted yet: approval comes first.
//! let method = PaymentMethod::Erc20(alloy::primitives::Address::ZERO);
//! assert!(authorization::needs_approval(&method, cost, None));
//! ```

// Core types and pure domain logic
pub mod authorization;
pub mod constants;
pub mod dashboard;
pub mod device;
pub mod error;
pub mod qr;
pub mod recent;
pub mod units;
pub mod valuation;

// Chain access (alloy provider-backed), not needed for WASM frontend builds
#[cfg(feature = "full")]
pub mod chain;

use alloy::sol;

// Device access contract interface. `getDeviceInfo` is viewer-dependent
// (whitelist flag and fee are resolved for the caller); `activate` is payable
// so native-token devices can be paid in the same call.
sol! {
    #[sol(rpc)]
    interface DeviceAccess {
        function getDeviceInfo(address user) external view returns (
            uint256 _feePerSecond,
            bool _isActive,
            address _lastActivatedBy,
            uint256 _sessionEndsAt,
            address _token,
            bool _isWhitelisted,
            uint256 _timeRemaining,
            string _tokenName,
            string _tokenSymbol,
            uint8 _tokenDecimals
        );
        function getDeviceDetails() external view returns (
            string _deviceName,
            string _deviceDescription,
            bool _useNativeToken,
            bool _lastUserWasWhitelisted,
            uint256 _whitelistFeePerSecond
        );
        function feePerSecond() external view returns (uint256);
        function token() external view returns (address);
        function activate(uint256 secondsToActivate) external payable;
        function deactivate() external;
    }
}

// Info registry contract: device registration, whitelists, and user
// profiles, shared across devices. Whitelist mutation is owner-only,
// enforced on-chain.
sol! {
    #[sol(rpc)]
    interface InfraLinkInfo {
        function registerDevice(address deviceContract, string _name, string _description) external;
        function updateDeviceInfo(address deviceContract, string _name, string _description) external;
        function deviceRegistry(address deviceContract) external view returns (
            string name,
            string description,
            address owner,
            bool isRegistered,
            uint256 registeredAt
        );
        function addUserToWhitelist(address user, address deviceContract, string whitelistName, uint256 feePerSecond, bool isFree) external;
        function removeUserFromWhitelist(address user, address deviceContract) external;
        function updateWhitelistEntry(address user, address deviceContract, string whitelistName, uint256 feePerSecond, bool isFree) external;
        function getUserWhitelistInfo(address userAddress, address deviceContract) external view returns (
            string _whitelistName,
            bool _isWhitelisted,
            uint256 _feePerSecond,
            bool _isFree,
            uint256 _addedAt,
            address _addedBy
        );
        function getDeviceWhitelistInfo(address deviceContract) external view returns (
            address[] addresses,
            string[] names,
            uint256[] fees,
            bool[] isFree,
            uint256 count
        );
        function getUserWhitelistEntries(address userAddress) external view returns (
            address[] deviceContracts,
            string[] deviceNames,
            string[] whitelistNames,
            uint256[] feesPerSecond,
            bool[] isFree,
            bool[] isActive,
            uint256[] addedAt,
            address[] addedBy,
            uint256 count
        );
        function getUserProfile(address user) external view returns (
            string name,
            string bio,
            string email,
            string avatar,
            bool exists,
            uint256 createdAt,
            uint256 updatedAt
        );
        function updateUserProfile(string _name, string _bio, string _email, string _avatar) external;
    }
}

// ERC-20 interface for token payment devices (allowance/balance checks,
// approval, display metadata).
sol! {
    #[sol(rpc)]
    interface ERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

// Re-exports
pub use constants::NetworkConfig;
pub use constants::*;
pub use error::InfraLinkError;

pub use authorization::NextAction;
pub use dashboard::{Dashboard, DashboardControl, DashboardState, DeviceSnapshot, TxKind};
pub use device::{
    DeviceDetails, DeviceInfo, DeviceRegistration, PaymentMethod, RecentDevice, TokenMeta,
    UserProfile, WhitelistEntry, WhitelistInfo, WhitelistMembership,
};
pub use qr::{extract_device_address, parse_device_address};
pub use recent::{RecentDeviceStore, MAX_RECENT_DEVICES};

#[cfg(feature = "full")]
pub use chain::{AlloyChainAccess, ChainAccess};
#[cfg(feature = "full")]
pub use recent::{InMemoryRecentStore, SqliteRecentStore};
