//! Payment authorization: which action the activation control should offer,
//! given the cost and the viewer's allowance/balance snapshots.
//!
//! Unknown (not yet fetched) allowance or balance is always treated
//! pessimistically: unknown allowance needs approval, unknown balance is
//! insufficient.

use alloy::primitives::U256;

use crate::device::PaymentMethod;

/// The single actionable control a device view should present.
/// A deactivate control is offered separately when the viewer holds the
/// current session (see [`crate::valuation::is_own_session`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// An ERC-20 approval must confirm before activation can be submitted.
    Approve,
    /// Activation (or extension of a live session) can be submitted now.
    Activate,
    /// No actionable button; show an insufficient-balance warning.
    InsufficientBalance,
}

/// Whether an approval transaction must precede activation.
///
/// Native payments carry value in the activation call itself and never need
/// approval; zero-cost sessions need none either, whatever the allowance.
pub fn needs_approval(method: &PaymentMethod, cost: U256, allowance: Option<U256>) -> bool {
    if cost.is_zero() {
        return false;
    }
    match method {
        PaymentMethod::Native => false,
        PaymentMethod::Erc20(_) => match allowance {
            None => true,
            Some(granted) => granted < cost,
        },
    }
}

/// Whether the balance selected by the payment method covers the cost.
pub fn has_sufficient_balance(
    method: &PaymentMethod,
    cost: U256,
    native_balance: Option<U256>,
    token_balance: Option<U256>,
) -> bool {
    if cost.is_zero() {
        return true;
    }
    let balance = match method {
        PaymentMethod::Native => native_balance,
        PaymentMethod::Erc20(_) => token_balance,
    };
    matches!(balance, Some(b) if b >= cost)
}

/// Resolve the activation control, in priority order: approve when an
/// approval is both needed and fundable, activate when the path is clear,
/// otherwise surface the balance problem.
pub fn next_action(
    method: &PaymentMethod,
    cost: U256,
    allowance: Option<U256>,
    native_balance: Option<U256>,
    token_balance: Option<U256>,
) -> NextAction {
    let approval = needs_approval(method, cost, allowance);
    let funded = has_sufficient_balance(method, cost, native_balance, token_balance);

    if !cost.is_zero() && approval && funded {
        NextAction::Approve
    } else if cost.is_zero() || (!approval && funded) {
        NextAction::Activate
    } else {
        NextAction::InsufficientBalance
    }
}
