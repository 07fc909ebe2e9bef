#![cfg(feature = "full")]

use infralink::device::RecentDevice;
use infralink::recent::{RecentDeviceStore, SqliteRecentStore, MAX_RECENT_DEVICES};

fn device(address: &str, name: &str) -> RecentDevice {
    RecentDevice {
        address: address.to_string(),
        name: name.to_string(),
        description: String::new(),
        last_connected_at: 0,
        is_whitelisted: Some(false),
        whitelist_name: None,
    }
}

#[test]
fn test_sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.db");
    let account = "0x1111111111111111111111111111111111111111";

    {
        let store = SqliteRecentStore::open(path.to_str().unwrap()).unwrap();
        store.record(account, device("0xaa", "Laser cutter"));
        store.record(account, device("0xbb", "3D printer"));
    }

    // New instance over the same file must see the same list
    let store = SqliteRecentStore::open(path.to_str().unwrap()).unwrap();
    let list = store.load(account);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].address, "0xbb");
    assert_eq!(list[1].address, "0xaa");
}

#[test]
fn test_sqlite_store_caps_and_dedupes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.db");
    let store = SqliteRecentStore::open(path.to_str().unwrap()).unwrap();
    let account = "0x2222222222222222222222222222222222222222";

    for i in 0..6 {
        store.record(account, device(&format!("0x{i:02}"), "Device"));
    }
    let list = store.load(account);
    assert_eq!(list.len(), MAX_RECENT_DEVICES);
    assert_eq!(list[0].address, "0x05");
    assert!(!list.iter().any(|d| d.address == "0x00"));

    // Re-recording an existing address moves it to the front, no duplicate
    store.record(account, device("0x03", "Device"));
    let list = store.load(account);
    assert_eq!(list.len(), MAX_RECENT_DEVICES);
    assert_eq!(list[0].address, "0x03");
    assert_eq!(
        list.iter().filter(|d| d.address == "0x03").count(),
        1
    );
}

#[test]
fn test_sqlite_store_accounts_are_disjoint() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.db");
    let store = SqliteRecentStore::open(path.to_str().unwrap()).unwrap();

    store.record("0xAlice", device("0xaa", "Mill"));
    store.record("0xBob", device("0xbb", "Lathe"));

    assert_eq!(store.load("0xAlice")[0].address, "0xaa");
    assert_eq!(store.load("0xBob")[0].address, "0xbb");

    store.clear("0xAlice");
    assert!(store.load("0xAlice").is_empty());
    assert_eq!(store.load("0xBob").len(), 1);
}

#[test]
fn test_sqlite_store_remove_single_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.db");
    let store = SqliteRecentStore::open(path.to_str().unwrap()).unwrap();
    let account = "0x3333333333333333333333333333333333333333";

    store.record(account, device("0xaa", "Mill"));
    store.record(account, device("0xbb", "Lathe"));
    store.remove(account, "0xaa");

    let list = store.load(account);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].address, "0xbb");
}

#[test]
fn test_sqlite_store_garbage_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.db");
    let account = "0x4444444444444444444444444444444444444444";

    // Plant unparseable JSON under the account key
    {
        let conn = rusqlite::Connection::open(path.to_str().unwrap()).unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS recent_devices (
                account TEXT PRIMARY KEY,
                devices TEXT NOT NULL
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO recent_devices (account, devices) VALUES (?1, ?2)",
            rusqlite::params![account, "{not json"],
        )
        .unwrap();
    }

    let store = SqliteRecentStore::open(path.to_str().unwrap()).unwrap();
    assert!(store.load(account).is_empty());

    // Recording over the bad row recovers the account
    store.record(account, device("0xaa", "Mill"));
    assert_eq!(store.load(account).len(), 1);
}

#[test]
fn test_sqlite_store_timestamps_are_millis_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.db");
    let store = SqliteRecentStore::open(path.to_str().unwrap()).unwrap();
    let account = "0x5555555555555555555555555555555555555555";

    store.record(account, device("0xaa", "Mill"));
    store.record(account, device("0xaa", "Mill"));

    let list = store.load(account);
    assert_eq!(list.len(), 1);
    // stamped at record time with unix millis, not the zero we passed in
    assert!(list[0].last_connected_at > 1_600_000_000_000);
}
