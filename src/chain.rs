//! Chain access port: typed read/write wrappers over the device, info
//! registry, and ERC-20 contracts.
//!
//! All domain logic of consequence lives on-chain; this module only calls it.
//! Writes carry send/receipt timeouts so a congested chain cannot hang a
//! device view indefinitely.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::Provider;

use crate::device::{
    DeviceDetails, DeviceInfo, DeviceRegistration, TokenMeta, UserProfile, WhitelistEntry,
    WhitelistInfo, WhitelistMembership,
};
use crate::error::{classify_tx_failure, InfraLinkError};
use crate::{DeviceAccess, InfraLinkInfo, ERC20};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Read and write access to a deployment's contracts.
///
/// One instance serves any number of device views; every call names the
/// device it targets. Implementations must be thread-safe.
pub trait ChainAccess: Send + Sync {
    fn device_info(
        &self,
        device: Address,
        viewer: Address,
    ) -> impl Future<Output = Result<DeviceInfo, InfraLinkError>> + Send;

    fn device_details(
        &self,
        device: Address,
    ) -> impl Future<Output = Result<DeviceDetails, InfraLinkError>> + Send;

    fn whitelist_info(
        &self,
        viewer: Address,
        device: Address,
    ) -> impl Future<Output = Result<WhitelistInfo, InfraLinkError>> + Send;

    /// Per-device whitelist roster (owner area).
    fn device_whitelist(
        &self,
        device: Address,
    ) -> impl Future<Output = Result<Vec<WhitelistEntry>, InfraLinkError>> + Send;

    /// The device's registry record on the info contract.
    fn device_registration(
        &self,
        device: Address,
    ) -> impl Future<Output = Result<DeviceRegistration, InfraLinkError>> + Send;

    /// All whitelist memberships a user holds, across devices.
    fn user_whitelist_entries(
        &self,
        user: Address,
    ) -> impl Future<Output = Result<Vec<WhitelistMembership>, InfraLinkError>> + Send;

    fn token_meta(
        &self,
        token: Address,
    ) -> impl Future<Output = Result<TokenMeta, InfraLinkError>> + Send;

    fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = Result<U256, InfraLinkError>> + Send;

    fn token_balance(
        &self,
        token: Address,
        owner: Address,
    ) -> impl Future<Output = Result<U256, InfraLinkError>> + Send;

    fn native_balance(
        &self,
        owner: Address,
    ) -> impl Future<Output = Result<U256, InfraLinkError>> + Send;

    fn user_profile(
        &self,
        user: Address,
    ) -> impl Future<Output = Result<UserProfile, InfraLinkError>> + Send;

    /// Approve `spender` to pull `amount` of `token`. Returns the tx hash
    /// once the receipt confirms.
    fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    /// Activate the device for `duration_secs`. For native-token devices,
    /// `value` is the transport-corrected payment attached to the call
    /// (see [`crate::units::to_transport_amount`]); `None` for ERC-20.
    fn activate(
        &self,
        device: Address,
        duration_secs: u64,
        value: Option<U256>,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    /// End the viewer's own session early.
    fn deactivate(
        &self,
        device: Address,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    fn update_profile(
        &self,
        name: String,
        bio: String,
        email: String,
        avatar: String,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    /// Register a device contract with the info registry (owner area).
    fn register_device(
        &self,
        device: Address,
        name: String,
        description: String,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    /// Update a registered device's name/description.
    fn update_device_info(
        &self,
        device: Address,
        name: String,
        description: String,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    /// Add `user` to a device's whitelist with an overridden fee.
    /// Owner-only; the contract enforces authorization.
    fn add_to_whitelist(
        &self,
        user: Address,
        device: Address,
        whitelist_name: String,
        fee_per_second: U256,
        is_free: bool,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    fn remove_from_whitelist(
        &self,
        user: Address,
        device: Address,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;

    fn update_whitelist_entry(
        &self,
        user: Address,
        device: Address,
        whitelist_name: String,
        fee_per_second: U256,
        is_free: bool,
    ) -> impl Future<Output = Result<TxHash, InfraLinkError>> + Send;
}

/// [`ChainAccess`] backed by an alloy provider.
pub struct AlloyChainAccess<P> {
    provider: P,
    /// Info registry deployment this access goes through.
    info_contract: Address,
}

impl<P> AlloyChainAccess<P> {
    pub fn new(provider: P, info_contract: Address) -> Self {
        Self {
            provider,
            info_contract,
        }
    }
}

fn read_err(call: &str, e: impl std::fmt::Display) -> InfraLinkError {
    InfraLinkError::ChainError(format!("{call} failed: {e}"))
}

/// Drive a state-changing call to its receipt with timeouts, then check the
/// status flag. `send()` may block on wallet interaction; the receipt wait is
/// network-bound.
async fn confirm<P, C>(
    call: alloy::contract::CallBuilder<P, C>,
    what: &str,
) -> Result<TxHash, InfraLinkError>
where
    P: Provider,
    C: alloy::contract::CallDecoder,
{
    let pending = tokio::time::timeout(SEND_TIMEOUT, call.send())
        .await
        .map_err(|_| InfraLinkError::ChainError(format!("{what} send timed out after 30s")))?
        .map_err(|e| classify_tx_failure(&e.to_string()))?;

    let receipt = tokio::time::timeout(RECEIPT_TIMEOUT, pending.get_receipt())
        .await
        .map_err(|_| InfraLinkError::ChainError(format!("{what} receipt timed out after 60s")))?
        .map_err(|e| classify_tx_failure(&e.to_string()))?;

    if !receipt.status() {
        return Err(classify_tx_failure(&format!("{what} reverted")));
    }

    Ok(receipt.transaction_hash)
}

impl<P: Provider + Send + Sync> ChainAccess for AlloyChainAccess<P> {
    async fn device_info(
        &self,
        device: Address,
        viewer: Address,
    ) -> Result<DeviceInfo, InfraLinkError> {
        let contract = DeviceAccess::new(device, &self.provider);
        let r = contract
            .getDeviceInfo(viewer)
            .call()
            .await
            .map_err(|e| read_err("getDeviceInfo", e))?;
        Ok(DeviceInfo {
            fee_per_second: r._feePerSecond,
            is_active: r._isActive,
            current_user: r._lastActivatedBy,
            session_ends_at: r._sessionEndsAt.saturating_to(),
            token: r._token,
            is_whitelisted: r._isWhitelisted,
            time_remaining: r._timeRemaining.saturating_to(),
            token_name: r._tokenName,
            token_symbol: r._tokenSymbol,
            token_decimals: r._tokenDecimals,
        })
    }

    async fn device_details(&self, device: Address) -> Result<DeviceDetails, InfraLinkError> {
        let contract = DeviceAccess::new(device, &self.provider);
        let r = contract
            .getDeviceDetails()
            .call()
            .await
            .map_err(|e| read_err("getDeviceDetails", e))?;
        Ok(DeviceDetails {
            name: r._deviceName,
            description: r._deviceDescription,
            use_native_token: r._useNativeToken,
            last_user_was_whitelisted: r._lastUserWasWhitelisted,
            whitelist_fee_per_second: r._whitelistFeePerSecond,
        })
    }

    async fn whitelist_info(
        &self,
        viewer: Address,
        device: Address,
    ) -> Result<WhitelistInfo, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        let r = contract
            .getUserWhitelistInfo(viewer, device)
            .call()
            .await
            .map_err(|e| read_err("getUserWhitelistInfo", e))?;
        Ok(WhitelistInfo {
            whitelist_name: r._whitelistName,
            is_whitelisted: r._isWhitelisted,
            fee_per_second: r._feePerSecond,
            is_free: r._isFree,
            added_at: r._addedAt.saturating_to(),
            added_by: r._addedBy,
        })
    }

    async fn device_whitelist(
        &self,
        device: Address,
    ) -> Result<Vec<WhitelistEntry>, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        let r = contract
            .getDeviceWhitelistInfo(device)
            .call()
            .await
            .map_err(|e| read_err("getDeviceWhitelistInfo", e))?;
        Ok(roster_rows(&r))
    }

    async fn device_registration(
        &self,
        device: Address,
    ) -> Result<DeviceRegistration, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        let r = contract
            .deviceRegistry(device)
            .call()
            .await
            .map_err(|e| read_err("deviceRegistry", e))?;
        Ok(DeviceRegistration {
            name: r.name,
            description: r.description,
            owner: r.owner,
            is_registered: r.isRegistered,
            registered_at: r.registeredAt.saturating_to(),
        })
    }

    async fn user_whitelist_entries(
        &self,
        user: Address,
    ) -> Result<Vec<WhitelistMembership>, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        let r = contract
            .getUserWhitelistEntries(user)
            .call()
            .await
            .map_err(|e| read_err("getUserWhitelistEntries", e))?;
        Ok(membership_rows(&r))
    }

    async fn token_meta(&self, token: Address) -> Result<TokenMeta, InfraLinkError> {
        let contract = ERC20::new(token, &self.provider);
        let symbol = contract
            .symbol()
            .call()
            .await
            .map_err(|e| read_err("symbol", e))?;
        let decimals = contract
            .decimals()
            .call()
            .await
            .map_err(|e| read_err("decimals", e))?;
        Ok(TokenMeta { symbol, decimals })
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, InfraLinkError> {
        let contract = ERC20::new(token, &self.provider);
        contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| read_err("allowance", e))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, InfraLinkError> {
        let contract = ERC20::new(token, &self.provider);
        contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| read_err("balanceOf", e))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, InfraLinkError> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(|e| read_err("get_balance", e))
    }

    async fn user_profile(&self, user: Address) -> Result<UserProfile, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        let r = contract
            .getUserProfile(user)
            .call()
            .await
            .map_err(|e| read_err("getUserProfile", e))?;
        Ok(UserProfile {
            name: r.name,
            bio: r.bio,
            email: r.email,
            avatar: r.avatar,
            exists: r.exists,
            created_at: r.createdAt.saturating_to(),
            updated_at: r.updatedAt.saturating_to(),
        })
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = ERC20::new(token, &self.provider);
        confirm(contract.approve(spender, amount), "approve").await
    }

    async fn activate(
        &self,
        device: Address,
        duration_secs: u64,
        value: Option<U256>,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = DeviceAccess::new(device, &self.provider);
        let mut call = contract.activate(U256::from(duration_secs));
        if let Some(v) = value {
            call = call.value(v);
        }
        confirm(call, "activate").await
    }

    async fn deactivate(&self, device: Address) -> Result<TxHash, InfraLinkError> {
        let contract = DeviceAccess::new(device, &self.provider);
        confirm(contract.deactivate(), "deactivate").await
    }

    async fn update_profile(
        &self,
        name: String,
        bio: String,
        email: String,
        avatar: String,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        confirm(
            contract.updateUserProfile(name, bio, email, avatar),
            "updateUserProfile",
        )
        .await
    }

    async fn register_device(
        &self,
        device: Address,
        name: String,
        description: String,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        confirm(
            contract.registerDevice(device, name, description),
            "registerDevice",
        )
        .await
    }

    async fn update_device_info(
        &self,
        device: Address,
        name: String,
        description: String,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        confirm(
            contract.updateDeviceInfo(device, name, description),
            "updateDeviceInfo",
        )
        .await
    }

    async fn add_to_whitelist(
        &self,
        user: Address,
        device: Address,
        whitelist_name: String,
        fee_per_second: U256,
        is_free: bool,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        confirm(
            contract.addUserToWhitelist(user, device, whitelist_name, fee_per_second, is_free),
            "addUserToWhitelist",
        )
        .await
    }

    async fn remove_from_whitelist(
        &self,
        user: Address,
        device: Address,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        confirm(
            contract.removeUserFromWhitelist(user, device),
            "removeUserFromWhitelist",
        )
        .await
    }

    async fn update_whitelist_entry(
        &self,
        user: Address,
        device: Address,
        whitelist_name: String,
        fee_per_second: U256,
        is_free: bool,
    ) -> Result<TxHash, InfraLinkError> {
        let contract = InfraLinkInfo::new(self.info_contract, &self.provider);
        confirm(
            contract.updateWhitelistEntry(user, device, whitelist_name, fee_per_second, is_free),
            "updateWhitelistEntry",
        )
        .await
    }
}

/// Zip the roster's parallel arrays into rows; trust the shortest length so a
/// malformed response cannot index out of bounds.
fn roster_rows(r: &InfraLinkInfo::getDeviceWhitelistInfoReturn) -> Vec<WhitelistEntry> {
    let count = r
        .count
        .saturating_to::<u64>()
        .min(r.addresses.len() as u64)
        .min(r.names.len() as u64)
        .min(r.fees.len() as u64)
        .min(r.isFree.len() as u64) as usize;

    (0..count)
        .map(|i| WhitelistEntry {
            account: r.addresses[i],
            name: r.names[i].clone(),
            fee_per_second: r.fees[i],
            is_free: r.isFree[i],
        })
        .collect()
}

fn membership_rows(r: &InfraLinkInfo::getUserWhitelistEntriesReturn) -> Vec<WhitelistMembership> {
    let count = r
        .count
        .saturating_to::<u64>()
        .min(r.deviceContracts.len() as u64)
        .min(r.deviceNames.len() as u64)
        .min(r.whitelistNames.len() as u64)
        .min(r.feesPerSecond.len() as u64)
        .min(r.isFree.len() as u64)
        .min(r.isActive.len() as u64)
        .min(r.addedAt.len() as u64)
        .min(r.addedBy.len() as u64) as usize;

    (0..count)
        .map(|i| WhitelistMembership {
            device_contract: r.deviceContracts[i],
            device_name: r.deviceNames[i].clone(),
            whitelist_name: r.whitelistNames[i].clone(),
            fee_per_second: r.feesPerSecond[i],
            is_free: r.isFree[i],
            is_active: r.isActive[i],
            added_at: r.addedAt[i].saturating_to(),
            added_by: r.addedBy[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_rows_zip_and_clamp() {
        let r = InfraLinkInfo::getDeviceWhitelistInfoReturn {
            addresses: vec![Address::new([0x01; 20]), Address::new([0x02; 20])],
            names: vec!["Staff".into(), "Guest".into()],
            fees: vec![U256::ZERO, U256::from(100u64)],
            isFree: vec![true, false],
            // count exceeding the arrays must not panic
            count: U256::from(5u64),
        };
        let rows = roster_rows(&r);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].account, Address::new([0x01; 20]));
        assert!(rows[0].is_free);
        assert_eq!(rows[1].fee_per_second, U256::from(100u64));
    }

    #[test]
    fn test_membership_rows_zip() {
        let device = Address::new([0xaa; 20]);
        let owner = Address::new([0xbb; 20]);
        let r = InfraLinkInfo::getUserWhitelistEntriesReturn {
            deviceContracts: vec![device],
            deviceNames: vec!["CNC mill".into()],
            whitelistNames: vec!["Staff".into()],
            feesPerSecond: vec![U256::from(10u64)],
            isFree: vec![false],
            isActive: vec![true],
            addedAt: vec![U256::from(1_700_000_000u64)],
            addedBy: vec![owner],
            count: U256::from(1u64),
        };
        let rows = membership_rows(&r);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].device_contract, device);
        assert_eq!(rows[0].device_name, "CNC mill");
        assert!(rows[0].is_active);
        assert_eq!(rows[0].added_at, 1_700_000_000);
        assert_eq!(rows[0].added_by, owner);
    }

    #[test]
    fn test_membership_rows_empty() {
        let r = InfraLinkInfo::getUserWhitelistEntriesReturn {
            deviceContracts: vec![],
            deviceNames: vec![],
            whitelistNames: vec![],
            feesPerSecond: vec![],
            isFree: vec![],
            isActive: vec![],
            addedAt: vec![],
            addedBy: vec![],
            count: U256::ZERO,
        };
        assert!(membership_rows(&r).is_empty());
    }
}
