use gomarketplace_core::{KeyValueStore, SqliteKeyValueStore, STORAGE_KEY};

#[test]
fn missing_key_reads_as_none() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    assert_eq!(store.get_item(STORAGE_KEY).unwrap(), None);
}

#[test]
fn set_item_replaces_prior_value() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();

    store.set_item(STORAGE_KEY, "[1]").unwrap();
    store.set_item(STORAGE_KEY, "[2]").unwrap();

    assert_eq!(store.get_item(STORAGE_KEY).unwrap().as_deref(), Some("[2]"));
}

#[test]
fn keys_are_independent_and_removable() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    store.set_item("@A:one", "1").unwrap();
    store.set_item("@A:two", "2").unwrap();

    store.remove_item("@A:one").unwrap();

    assert_eq!(store.get_item("@A:one").unwrap(), None);
    assert_eq!(store.get_item("@A:two").unwrap().as_deref(), Some("2"));
}

#[test]
fn values_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.sqlite3");

    let store = SqliteKeyValueStore::open(&path).unwrap();
    store.set_item(STORAGE_KEY, r#"[{"id":"a"}]"#).unwrap();
    drop(store);

    let reopened = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(
        reopened.get_item(STORAGE_KEY).unwrap().as_deref(),
        Some(r#"[{"id":"a"}]"#)
    );
}
