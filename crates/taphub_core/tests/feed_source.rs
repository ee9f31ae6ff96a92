use std::fs;
use taphub_core::db::open_db_in_memory;
use taphub_core::{
    CycleOutcome, JsonFeedSource, LocationNaming, LogSink, PollService, RosterStore,
    SnapshotSource, SourceError, SqliteRosterStore, StopSignal, WatchConfig,
};

const FEED: &str = r#"{
    "version": 12,
    "bars": [
        {
            "id": 7,
            "name": "EDINBURGH",
            "data": {
                "tap": [
                    {"name": "Punk IPA", "abv": "5.4"},
                    {"name": "Punk IPA", "abv": "5.4"},
                    {"name": "GUEST BEER"},
                    {"name": ""}
                ]
            }
        },
        {"id": 8, "name": "camden town", "data": {"tap": [{"name": "Elvis Juice"}]}}
    ]
}"#;

fn naming() -> LocationNaming {
    LocationNaming {
        prefix: Some("BrewDog".to_string()),
        title_case: true,
    }
}

#[test]
fn fetch_reads_feed_file_each_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bars.json");
    fs::write(&path, FEED).unwrap();
    let mut source = JsonFeedSource::new(&path, naming());

    let snapshot = source.fetch().unwrap();
    let names: Vec<_> = snapshot
        .locations()
        .map(|(name, _)| name.to_string())
        .collect();
    assert_eq!(names, vec!["BrewDog Camden Town", "BrewDog EDINBURGH"]);

    fs::write(&path, r#"{"bars": []}"#).unwrap();
    assert!(source.fetch().unwrap().is_empty());
}

#[test]
fn missing_or_malformed_feed_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bars.json");
    let mut source = JsonFeedSource::new(&path, naming());

    assert!(matches!(source.fetch(), Err(SourceError::Io { .. })));

    fs::write(&path, "{ truncated").unwrap();
    let err = source.fetch().unwrap_err();
    assert!(matches!(err, SourceError::Parse { .. }));
    assert!(err.to_string().contains("bars.json"));
}

#[test]
fn feed_file_drives_a_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bars.json");
    fs::write(&path, FEED).unwrap();

    let conn = open_db_in_memory().unwrap();
    let store = SqliteRosterStore::try_new(&conn).unwrap();
    let config = WatchConfig {
        noise_substrings: vec!["GUEST BEER".to_string()],
        notify_locations: vec!["EDINBURGH".to_string()],
        title_case_locations: true,
        ..WatchConfig::default()
    };
    let service = PollService::new(&store, LogSink, &config);
    let mut source = JsonFeedSource::new(&path, LocationNaming::from_config(&config));

    assert_eq!(service.run(&mut source, &StopSignal::new(), Some(1)), 1);

    let locations: Vec<_> = store
        .list_locations()
        .unwrap()
        .into_iter()
        .map(|location| location.name)
        .collect();
    assert_eq!(locations, vec!["Camden Town", "EDINBURGH"]);

    let location = store.get_or_create_location("EDINBURGH").unwrap();
    let items = store.load_current_items(&location).unwrap();
    assert_eq!(items.into_iter().collect::<Vec<_>>(), vec!["Punk IPA"]);

    let again = source.fetch().unwrap();
    assert!(matches!(
        service.run_cycle(Some(again)),
        CycleOutcome::Completed(report) if !report.has_changes()
    ));
}
