//! Per-account registry of recently connected devices.
//!
//! A small most-recent-first list, de-duplicated by address, capped at
//! [`MAX_RECENT_DEVICES`], namespaced by the connected account so switching
//! accounts yields a disjoint list. Storage failures degrade to an empty
//! list, never an error — losing the convenience list must not break a view.

use crate::device::RecentDevice;

/// Maximum entries kept per account.
pub const MAX_RECENT_DEVICES: usize = 5;

/// Trait for recent-device storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`). A WASM frontend
/// implements this over browser local storage; native builds get the
/// in-memory and SQLite backends below.
pub trait RecentDeviceStore: Send + Sync {
    /// The account's list, most recent first. Empty when nothing is stored
    /// or the stored data cannot be read.
    fn load(&self, account: &str) -> Vec<RecentDevice>;

    /// Record a connection: de-duplicate by address, stamp with the current
    /// time, prepend, truncate, persist.
    fn record(&self, account: &str, device: RecentDevice);

    /// Remove one entry by its literal address string.
    fn remove(&self, account: &str, address: &str);

    /// Drop the account's entire list.
    fn clear(&self, account: &str);
}

/// Apply the registry's insertion rule to a list in place.
///
/// The address key match is case-sensitive on the literal string, matching
/// how addresses were stored at connect time.
pub fn push_recent(list: &mut Vec<RecentDevice>, mut device: RecentDevice, now_millis: u64) {
    device.last_connected_at = now_millis;
    list.retain(|d| d.address != device.address);
    list.insert(0, device);
    list.truncate(MAX_RECENT_DEVICES);
}

/// Accounts are compared case-insensitively everywhere else, so the storage
/// key is normalized once here.
#[cfg(feature = "full")]
fn account_key(account: &str) -> String {
    account.to_ascii_lowercase()
}

#[cfg(feature = "full")]
fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// In-memory store backed by DashMap. Lost on restart.
#[cfg(feature = "full")]
pub struct InMemoryRecentStore {
    lists: dashmap::DashMap<String, Vec<RecentDevice>>,
}

#[cfg(feature = "full")]
impl InMemoryRecentStore {
    pub fn new() -> Self {
        Self {
            lists: dashmap::DashMap::new(),
        }
    }
}

#[cfg(feature = "full")]
impl Default for InMemoryRecentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "full")]
impl RecentDeviceStore for InMemoryRecentStore {
    fn load(&self, account: &str) -> Vec<RecentDevice> {
        self.lists
            .get(&account_key(account))
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    fn record(&self, account: &str, device: RecentDevice) {
        let mut entry = self.lists.entry(account_key(account)).or_default();
        push_recent(&mut entry, device, now_millis());
    }

    fn remove(&self, account: &str, address: &str) {
        if let Some(mut list) = self.lists.get_mut(&account_key(account)) {
            list.retain(|d| d.address != address);
        }
    }

    fn clear(&self, account: &str) {
        self.lists.remove(&account_key(account));
    }
}

/// Persistent store backed by SQLite: one JSON-serialized list per account
/// key. Survives restarts.
#[cfg(feature = "full")]
pub struct SqliteRecentStore {
    conn: std::sync::Mutex<rusqlite::Connection>,
}

#[cfg(feature = "full")]
impl SqliteRecentStore {
    /// Open (or create) the recent-device database at the given path.
    ///
    /// On Unix the file permissions are restricted to 0600, since the list
    /// reveals which devices an account has used.
    pub fn open(path: &str) -> Result<Self, crate::error::InfraLinkError> {
        let storage_err =
            |e: rusqlite::Error| crate::error::InfraLinkError::StorageError(e.to_string());
        let conn = rusqlite::Connection::open(path).map_err(storage_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS recent_devices (
                account TEXT PRIMARY KEY,
                devices TEXT NOT NULL
            );
            PRAGMA journal_mode=WAL;",
        )
        .map_err(storage_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) =
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            {
                tracing::warn!(
                    path = %path,
                    error = %e,
                    "failed to set recent-device database file permissions to 0600"
                );
            }
        }

        Ok(Self {
            conn: std::sync::Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, rusqlite::Connection> {
        match self.conn.lock() {
            Ok(c) => c,
            Err(poisoned) => {
                tracing::error!("recent-device store mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn save(&self, key: &str, list: &[RecentDevice]) {
        let json = match serde_json::to_string(list) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize recent devices");
                return;
            }
        };
        let conn = self.lock();
        if let Err(e) = conn.execute(
            "INSERT OR REPLACE INTO recent_devices (account, devices) VALUES (?1, ?2)",
            rusqlite::params![key, json],
        ) {
            tracing::warn!(error = %e, "failed to persist recent devices");
        }
    }
}

#[cfg(feature = "full")]
impl RecentDeviceStore for SqliteRecentStore {
    fn load(&self, account: &str) -> Vec<RecentDevice> {
        let key = account_key(account);
        let stored: Option<String> = {
            let conn = self.lock();
            conn.query_row(
                "SELECT devices FROM recent_devices WHERE account = ?1",
                [&key],
                |row| row.get(0),
            )
            .ok()
        };
        let Some(json) = stored else {
            return Vec::new();
        };
        match serde_json::from_str(&json) {
            Ok(list) => list,
            Err(e) => {
                // Degrade to empty rather than propagating a parse error.
                tracing::warn!(account = %key, error = %e, "stored recent-device list unreadable");
                Vec::new()
            }
        }
    }

    fn record(&self, account: &str, device: RecentDevice) {
        let key = account_key(account);
        let mut list = self.load(account);
        push_recent(&mut list, device, now_millis());
        self.save(&key, &list);
    }

    fn remove(&self, account: &str, address: &str) {
        let key = account_key(account);
        let mut list = self.load(account);
        list.retain(|d| d.address != address);
        self.save(&key, &list);
    }

    fn clear(&self, account: &str) {
        let conn = self.lock();
        if let Err(e) = conn.execute(
            "DELETE FROM recent_devices WHERE account = ?1",
            [&account_key(account)],
        ) {
            tracing::warn!(error = %e, "failed to clear recent devices");
        }
    }
}
