use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Viewer-dependent device snapshot from `DeviceAccess::getDeviceInfo`.
/// Refreshed on the poll interval; never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub fee_per_second: U256,
    pub is_active: bool,
    /// Account that started the current (or most recent) session.
    pub current_user: Address,
    pub session_ends_at: u64,
    /// Payment token, or a sentinel when the device bills in native currency.
    pub token: Address,
    /// Whitelist flag as the device contract sees it. The info registry's
    /// answer takes precedence when both are available.
    pub is_whitelisted: bool,
    /// Session length originally purchased, in seconds.
    pub time_remaining: u64,
    pub token_name: String,
    pub token_symbol: String,
    pub token_decimals: u8,
}

/// Static-ish device metadata from `DeviceAccess::getDeviceDetails`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDetails {
    pub name: String,
    pub description: String,
    pub use_native_token: bool,
    pub last_user_was_whitelisted: bool,
    pub whitelist_fee_per_second: U256,
}

/// Per-account whitelist record from the info registry.
///
/// When `is_whitelisted` is false the fee fields carry no meaning and must
/// not override the device's base fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistInfo {
    pub whitelist_name: String,
    pub is_whitelisted: bool,
    pub fee_per_second: U256,
    pub is_free: bool,
    pub added_at: u64,
    pub added_by: Address,
}

/// One row of a device's whitelist roster (`getDeviceWhitelistInfo`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistEntry {
    pub account: Address,
    pub name: String,
    pub fee_per_second: U256,
    pub is_free: bool,
}

/// A device's registry record (`deviceRegistry`): owner-area metadata kept on
/// the info contract, separate from the device contract's own details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistration {
    pub name: String,
    pub description: String,
    pub owner: Address,
    pub is_registered: bool,
    pub registered_at: u64,
}

/// One of a user's whitelist memberships across devices
/// (`getUserWhitelistEntries`), shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistMembership {
    pub device_contract: Address,
    pub device_name: String,
    pub whitelist_name: String,
    pub fee_per_second: U256,
    pub is_free: bool,
    pub is_active: bool,
    pub added_at: u64,
    pub added_by: Address,
}

/// ERC-20 display metadata. Fetched once per token address and cached by the
/// caller for the viewing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMeta {
    pub symbol: String,
    pub decimals: u8,
}

/// On-chain user profile from the info registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub bio: String,
    pub email: String,
    pub avatar: String,
    pub exists: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

/// How a device gets paid. A tagged variant instead of a `useNativeToken`
/// bool so match sites stay exhaustive as payment kinds grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Native,
    Erc20(Address),
}

impl PaymentMethod {
    /// Derive the payment method for a device from its snapshots.
    pub fn from_device(details: &DeviceDetails, info: &DeviceInfo) -> Self {
        if details.use_native_token {
            PaymentMethod::Native
        } else {
            PaymentMethod::Erc20(info.token)
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, PaymentMethod::Native)
    }
}

/// A previously connected device, persisted per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDevice {
    /// Literal `0x…` contract address string; the list's unique key.
    pub address: String,
    pub name: String,
    pub description: String,
    /// Unix milliseconds of the most recent successful connection.
    pub last_connected_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_whitelisted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitelist_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_from_device() {
        let token = Address::new([0x11; 20]);
        let info = DeviceInfo {
            fee_per_second: U256::from(1u64),
            is_active: false,
            current_user: Address::ZERO,
            session_ends_at: 0,
            token,
            is_whitelisted: false,
            time_remaining: 0,
            token_name: "Test".into(),
            token_symbol: "TST".into(),
            token_decimals: 18,
        };
        let mut details = DeviceDetails {
            name: "Laser cutter".into(),
            description: String::new(),
            use_native_token: false,
            last_user_was_whitelisted: false,
            whitelist_fee_per_second: U256::ZERO,
        };
        assert_eq!(
            PaymentMethod::from_device(&details, &info),
            PaymentMethod::Erc20(token)
        );
        details.use_native_token = true;
        assert!(PaymentMethod::from_device(&details, &info).is_native());
    }

    #[test]
    fn test_recent_device_json_shape() {
        let d = RecentDevice {
            address: "0xaff84326fc701dfb3c5881b2749dba27e9a98978".into(),
            name: "3D printer".into(),
            description: "Workshop".into(),
            last_connected_at: 1_700_000_000_000,
            is_whitelisted: None,
            whitelist_name: None,
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"lastConnectedAt\":1700000000000"));
        // absent optionals are omitted, matching the persisted wire shape
        assert!(!json.contains("isWhitelisted"));
        let back: RecentDevice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
