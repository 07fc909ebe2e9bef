//! Session valuation: billing and occupancy facts derived from chain
//! snapshots. Every function here is pure and total; callers default absent
//! upstream fields to zero/false before calling in.

use alloy::primitives::{Address, U256};

use crate::device::{DeviceInfo, WhitelistInfo};

/// Fee rate actually charged to the viewer, after whitelist override.
///
/// The info registry's record wins over the device contract's own
/// `is_whitelisted` flag whenever a record is present; a non-whitelisted
/// record never overrides the base fee.
pub fn applicable_fee_per_second(info: &DeviceInfo, whitelist: Option<&WhitelistInfo>) -> U256 {
    match whitelist {
        Some(w) if w.is_whitelisted => {
            if w.is_free {
                U256::ZERO
            } else {
                w.fee_per_second
            }
        }
        _ => info.fee_per_second,
    }
}

/// Total cost of a session, exact at any magnitude.
pub fn total_cost(duration_seconds: u64, fee_per_second: U256) -> U256 {
    fee_per_second.saturating_mul(U256::from(duration_seconds))
}

/// A session is live iff the device reports active and the end time is still
/// in the future. An inactive device's `session_ends_at` carries no meaning.
pub fn is_session_live(info: &DeviceInfo, now_secs: u64) -> bool {
    info.is_active && info.session_ends_at > now_secs
}

/// Seconds until the current session ends, saturating at zero.
pub fn time_left(info: &DeviceInfo, now_secs: u64) -> u64 {
    info.session_ends_at.saturating_sub(now_secs)
}

/// Elapsed share of the purchased session, clamped to `0..=100`.
pub fn session_progress_percent(info: &DeviceInfo, now_secs: u64) -> u8 {
    if info.time_remaining == 0 {
        return 0;
    }
    let left = time_left(info, now_secs).min(info.time_remaining);
    let elapsed = info.time_remaining - left;
    let percent = (elapsed as u128 * 100) / info.time_remaining as u128;
    percent.min(100) as u8
}

/// Whether the viewer holds the current session. Address equality is by
/// bytes, so checksum-cased and lowercased renderings compare equal.
pub fn is_own_session(info: &DeviceInfo, account: Address) -> bool {
    info.current_user == account
}
