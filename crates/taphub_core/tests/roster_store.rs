use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};
use taphub_core::db::open_db_in_memory;
use taphub_core::{RosterStore, SqliteRosterStore, StoreError};
use uuid::Uuid;

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn get_or_create_location_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();

    let first = store.get_or_create_location("BrewDog EDINBURGH").unwrap();
    let second = store.get_or_create_location("BrewDog EDINBURGH").unwrap();
    assert_eq!(first, second);

    let other = store.get_or_create_location("BrewDog Camden").unwrap();
    assert_ne!(other.uuid, first.uuid);

    let listed: Vec<_> = store
        .list_locations()
        .unwrap()
        .into_iter()
        .map(|location| location.name)
        .collect();
    assert_eq!(listed, vec!["BrewDog Camden", "BrewDog EDINBURGH"]);
}

#[test]
fn blank_location_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();

    let err = store.get_or_create_location("  ").unwrap_err();
    assert!(matches!(err, StoreError::InvalidLocationName));
    assert!(store.list_locations().unwrap().is_empty());
}

#[test]
fn new_location_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();

    let location = store.get_or_create_location("X").unwrap();
    assert!(store.load_current_items(&location).unwrap().is_empty());
}

#[test]
fn apply_changes_adds_and_removes_items() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let location = store.get_or_create_location("X").unwrap();

    store
        .apply_changes(&location, &names(&["Lager", "IPA"]), &names(&[]))
        .unwrap();
    assert_eq!(
        store.load_current_items(&location).unwrap(),
        names(&["IPA", "Lager"])
    );

    store
        .apply_changes(&location, &names(&["Stout"]), &names(&["IPA"]))
        .unwrap();
    assert_eq!(
        store.load_current_items(&location).unwrap(),
        names(&["Lager", "Stout"])
    );

    let items = store.list_items(&location).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Lager");
    assert_eq!(items[1].name, "Stout");
    assert!(items.iter().all(|item| item.location_uuid == location.uuid));
    assert!(items.iter().all(|item| item.first_seen_at > 0));
}

#[test]
fn surviving_items_keep_first_seen_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let location = store.get_or_create_location("X").unwrap();

    store
        .apply_changes(&location, &names(&["Lager"]), &names(&[]))
        .unwrap();
    conn.execute("UPDATE items SET first_seen_at = 42 WHERE name = 'Lager';", [])
        .unwrap();

    store
        .apply_changes(&location, &names(&["IPA"]), &names(&[]))
        .unwrap();

    let items = store.list_items(&location).unwrap();
    let lager = items.iter().find(|item| item.name == "Lager").unwrap();
    let ipa = items.iter().find(|item| item.name == "IPA").unwrap();
    assert_eq!(lager.first_seen_at, 42);
    assert!(ipa.first_seen_at > 42);
}

#[test]
fn timestamps_are_epoch_millis_at_second_precision() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();

    let before = now_millis() / 1000 * 1000;
    let location = store.get_or_create_location("X").unwrap();
    store
        .apply_changes(&location, &names(&["IPA"]), &names(&[]))
        .unwrap();
    let after = now_millis();

    let items = store.list_items(&location).unwrap();
    for stamp in [location.created_at, items[0].first_seen_at] {
        assert_eq!(stamp % 1000, 0);
        assert!(
            (before..=after).contains(&stamp),
            "{stamp} not in {before}..={after}"
        );
    }
}

fn now_millis() -> i64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    i64::try_from(elapsed.as_millis()).unwrap()
}

#[test]
fn items_are_scoped_to_their_location() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let x = store.get_or_create_location("X").unwrap();
    let y = store.get_or_create_location("Y").unwrap();

    store
        .apply_changes(&x, &names(&["IPA"]), &names(&[]))
        .unwrap();
    store
        .apply_changes(&y, &names(&["IPA", "Stout"]), &names(&[]))
        .unwrap();
    store.apply_changes(&y, &names(&[]), &names(&["IPA"])).unwrap();

    assert_eq!(store.load_current_items(&x).unwrap(), names(&["IPA"]));
    assert_eq!(store.load_current_items(&y).unwrap(), names(&["Stout"]));
}

#[test]
fn failed_apply_rolls_back_the_whole_location() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let location = store.get_or_create_location("X").unwrap();
    store
        .apply_changes(&location, &names(&["Lager", "IPA"]), &names(&[]))
        .unwrap();

    conn.execute_batch(
        "CREATE TRIGGER reject_broken BEFORE INSERT ON items
         WHEN NEW.name = 'BROKEN'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();

    let err = store
        .apply_changes(&location, &names(&["Amber", "BROKEN"]), &names(&["Lager"]))
        .unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));

    assert_eq!(
        store.load_current_items(&location).unwrap(),
        names(&["IPA", "Lager"])
    );
}

#[test]
fn unknown_location_handle_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let mut location = store.get_or_create_location("X").unwrap();
    location.uuid = Uuid::new_v4();

    let err = store.load_current_items(&location).unwrap_err();
    assert!(matches!(err, StoreError::LocationNotFound(id) if id == location.uuid));

    let err = store
        .apply_changes(&location, &names(&["IPA"]), &names(&[]))
        .unwrap_err();
    assert!(matches!(err, StoreError::LocationNotFound(_)));
}
