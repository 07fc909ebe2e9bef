use thiserror::Error;

/// Errors returned by InfraLink operations.
///
/// Nothing here is fatal to an embedding application; every variant is scoped
/// to a single device view and recoverable by retry or navigation.
#[derive(Debug, Error)]
pub enum InfraLinkError {
    #[error("chain error: {0}")]
    ChainError(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("transaction rejected in wallet")]
    TxRejected,

    #[error("transaction reverted: {0}")]
    TxReverted(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Fallback shown when a revert reason matches nothing in [`REVERT_MESSAGES`].
pub const GENERIC_TX_FAILURE: &str = "The transaction failed. Please try again.";

/// Known revert-reason substrings and the user-facing message for each.
/// Matching is substring-based because providers wrap reasons differently.
pub const REVERT_MESSAGES: &[(&str, &str)] = &[
    (
        "Device is currently active",
        "The device is busy with another session.",
    ),
    (
        "Insufficient payment",
        "The payment does not cover the requested duration.",
    ),
    (
        "Insufficient allowance",
        "Token allowance is too low. Approve the token again.",
    ),
    (
        "transfer amount exceeds balance",
        "Your token balance is too low for this session.",
    ),
    (
        "Not whitelisted",
        "This account is not on the device's whitelist.",
    ),
    (
        "Only current user",
        "Only the current session holder can deactivate the device.",
    ),
];

/// Map a raw revert reason to a specific user-facing message, if recognized.
pub fn revert_user_message(reason: &str) -> Option<&'static str> {
    REVERT_MESSAGES
        .iter()
        .find(|(needle, _)| reason.contains(needle))
        .map(|(_, msg)| *msg)
}

/// Classify a provider/wallet error string into the error taxonomy:
/// user cancellation becomes [`InfraLinkError::TxRejected`], anything else a
/// [`InfraLinkError::TxReverted`] carrying the mapped (or generic) message.
pub fn classify_tx_failure(raw: &str) -> InfraLinkError {
    let lower = raw.to_lowercase();
    if lower.contains("user rejected") || lower.contains("user denied") {
        return InfraLinkError::TxRejected;
    }
    let message = revert_user_message(raw).unwrap_or(GENERIC_TX_FAILURE);
    InfraLinkError::TxReverted(message.to_string())
}
