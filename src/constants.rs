use alloy::primitives::Address;

/// Decimal count wallet transports assume for native-currency values.
/// EVM wallets submit `msg.value` in 18-decimal wei regardless of what the
/// chain's native unit actually uses.
pub const WALLET_NATIVE_DECIMALS: u8 = 18;

/// Device-info poll cadence used by dashboards.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Reference DeviceAccess deployment.
pub const DEVICE_CONTRACT_ADDRESS: Address = Address::new([
    0xaf, 0xf8, 0x43, 0x26, 0xfc, 0x70, 0x1d, 0xfb, 0x3c, 0x58, 0x81, 0xb2, 0x74, 0x9d, 0xba, 0x27,
    0xe9, 0xa9, 0x89, 0x78,
]);

/// Reference InfraLink info registry deployment.
pub const INFRALINK_INFO_ADDRESS: Address = Address::new([
    0x7a, 0xee, 0x0c, 0xbb, 0xcd, 0x0e, 0x52, 0x57, 0x93, 0x1f, 0x7d, 0xc8, 0x7f, 0x03, 0x45, 0xc1,
    0xbb, 0x2a, 0xab, 0x39,
]);

/// Per-network native currency facts. Decouples decimal correction from call
/// sites: chains whose native unit is not 18 decimals get an entry here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub native_decimals: u8,
}

/// Known networks with a native decimal count different from the wallet
/// assumption. Hedera denominates HBAR in 8-decimal tinybars on-chain while
/// its EVM-compatible transport still speaks 18 decimals.
pub const NETWORKS: &[NetworkConfig] = &[
    NetworkConfig {
        chain_id: 295,
        name: "Hedera Mainnet",
        native_symbol: "HBAR",
        native_decimals: 8,
    },
    NetworkConfig {
        chain_id: 296,
        name: "Hedera Testnet",
        native_symbol: "HBAR",
        native_decimals: 8,
    },
    NetworkConfig {
        chain_id: 297,
        name: "Hedera Previewnet",
        native_symbol: "HBAR",
        native_decimals: 8,
    },
];

/// Look up a network entry by chain id.
pub fn network(chain_id: u64) -> Option<&'static NetworkConfig> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Actual on-chain native decimals for a chain, defaulting to the wallet
/// assumption for unlisted networks.
pub fn native_decimals(chain_id: u64) -> u8 {
    network(chain_id)
        .map(|n| n.native_decimals)
        .unwrap_or(WALLET_NATIVE_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hedera_testnet_native_decimals() {
        assert_eq!(native_decimals(296), 8);
        assert_eq!(network(296).unwrap().native_symbol, "HBAR");
    }

    #[test]
    fn test_unknown_chain_defaults_to_wallet_decimals() {
        assert_eq!(native_decimals(1), 18);
        assert!(network(1).is_none());
    }

    #[test]
    fn test_reference_addresses_render_as_hex() {
        let s = format!("{DEVICE_CONTRACT_ADDRESS:?}");
        assert!(s.to_lowercase().contains("aff84326"));
        let s = format!("{INFRALINK_INFO_ADDRESS:?}");
        assert!(s.to_lowercase().contains("7aee0cbb"));
    }
}
