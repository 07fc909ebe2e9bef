//! Per-view dashboard state: poll bookkeeping, single-in-flight transaction
//! guards, and the combined control decision a device view renders from.
//!
//! Each device view owns one [`Dashboard`]; no state is shared across views.
//! Chain reads are polled, and responses can complete out of order — only the
//! completion matching the latest issued request is applied, so a stale read
//! can never overwrite a fresher one.

use alloy::primitives::{Address, U256};

use crate::authorization::{next_action, NextAction};
use crate::device::{DeviceDetails, DeviceInfo, PaymentMethod, WhitelistInfo};
use crate::error::InfraLinkError;
use crate::units::to_display_amount;
use crate::valuation::{
    applicable_fee_per_second, is_own_session, is_session_live, session_progress_percent,
    time_left, total_cost,
};

/// Everything one poll round reads for a device view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub info: DeviceInfo,
    pub details: DeviceDetails,
    /// Registry record for the viewer; `None` while unfetched or when the
    /// registry has no record.
    pub whitelist: Option<WhitelistInfo>,
    pub allowance: Option<U256>,
    pub native_balance: Option<U256>,
    pub token_balance: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    Idle,
    Loading,
    Loaded(DeviceSnapshot),
    LoadError(String),
}

/// State-changing transaction kinds; at most one of each may be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Approve,
    Activate,
    Deactivate,
}

const TX_KINDS: usize = 3;

impl TxKind {
    fn index(self) -> usize {
        match self {
            TxKind::Approve => 0,
            TxKind::Activate => 1,
            TxKind::Deactivate => 2,
        }
    }
}

/// The rendered control set for one poll's snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardControl {
    pub action: NextAction,
    /// Offered alongside `action` when the viewer holds the live session.
    pub can_deactivate: bool,
    pub method: PaymentMethod,
    pub fee_per_second: U256,
    pub cost: U256,
    pub fee_display: String,
    pub cost_display: String,
    pub token_symbol: String,
    pub session_live: bool,
    pub own_session: bool,
    pub time_left_secs: u64,
    pub progress_percent: u8,
}

/// One device view's lifecycle state.
pub struct Dashboard {
    state: DashboardState,
    /// Sequence number of the latest issued poll; completions for anything
    /// older are discarded.
    poll_seq: u64,
    busy: [bool; TX_KINDS],
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            state: DashboardState::Idle,
            poll_seq: 0,
            busy: [false; TX_KINDS],
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Start a poll round. Returns the sequence number the caller must hand
    /// back to [`complete_poll`](Self::complete_poll).
    pub fn begin_poll(&mut self) -> u64 {
        self.poll_seq += 1;
        // A retry after a failed load shows as loading again; a loaded view
        // keeps its snapshot visible while the refresh is in flight.
        if matches!(
            self.state,
            DashboardState::Idle | DashboardState::LoadError(_)
        ) {
            self.state = DashboardState::Loading;
        }
        self.poll_seq
    }

    /// Apply a completed poll. Returns `false` (and changes nothing) when a
    /// newer request has been issued since `seq` started.
    pub fn complete_poll(
        &mut self,
        seq: u64,
        result: Result<DeviceSnapshot, InfraLinkError>,
    ) -> bool {
        if seq != self.poll_seq {
            tracing::debug!(seq, latest = self.poll_seq, "discarding superseded poll response");
            return false;
        }
        self.state = match result {
            Ok(snapshot) => DashboardState::Loaded(snapshot),
            Err(e) => DashboardState::LoadError(e.to_string()),
        };
        true
    }

    /// Claim the busy flag for a transaction kind. `false` means a prior
    /// submission of the same kind is still unconfirmed and the caller must
    /// not submit another.
    pub fn begin_tx(&mut self, kind: TxKind) -> bool {
        let flag = &mut self.busy[kind.index()];
        if *flag {
            return false;
        }
        *flag = true;
        true
    }

    /// Release the busy flag after the transaction settles (confirmed,
    /// rejected, or reverted). The view transitions back through `Loading` so
    /// the next poll re-evaluates fee and occupancy from fresh chain state
    /// instead of mutating the snapshot locally.
    pub fn finish_tx(&mut self, kind: TxKind) {
        self.busy[kind.index()] = false;
        self.state = DashboardState::Loading;
        // Invalidate polls issued before the transaction settled; their data
        // predates the state change. No outstanding request holds this value,
        // so only the next begin_poll can complete.
        self.poll_seq += 1;
    }

    pub fn is_busy(&self, kind: TxKind) -> bool {
        self.busy[kind.index()]
    }

    /// Derive the control set for the loaded snapshot, or `None` while not
    /// loaded. `duration_secs` is the session length the viewer entered.
    pub fn control(
        &self,
        viewer: Address,
        duration_secs: u64,
        now_secs: u64,
    ) -> Option<DashboardControl> {
        let DashboardState::Loaded(snapshot) = &self.state else {
            return None;
        };
        Some(build_control(snapshot, viewer, duration_secs, now_secs))
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

fn build_control(
    snapshot: &DeviceSnapshot,
    viewer: Address,
    duration_secs: u64,
    now_secs: u64,
) -> DashboardControl {
    let info = &snapshot.info;
    let method = PaymentMethod::from_device(&snapshot.details, info);

    let fee = applicable_fee_per_second(info, snapshot.whitelist.as_ref());
    let cost = total_cost(duration_secs, fee);
    let action = next_action(
        &method,
        cost,
        snapshot.allowance,
        snapshot.native_balance,
        snapshot.token_balance,
    );

    let live = is_session_live(info, now_secs);
    let own = is_own_session(info, viewer);

    DashboardControl {
        action,
        can_deactivate: live && own,
        method,
        fee_per_second: fee,
        cost,
        fee_display: to_display_amount(fee, info.token_decimals),
        cost_display: to_display_amount(cost, info.token_decimals),
        token_symbol: info.token_symbol.clone(),
        session_live: live,
        own_session: own,
        time_left_secs: time_left(info, now_secs),
        progress_percent: session_progress_percent(info, now_secs),
    }
}
