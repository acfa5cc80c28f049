// crates/diff-engine/tests/engine_tests.rs
//! Behaviour of the diff engine across runs

use castrelay_diff_engine::{
    diff_entries, EpisodeDiffEngine, FeedEntry, Marker, MarkerStore, MemoryMarkerStore,
};

fn feed(guids: &[&str]) -> Vec<FeedEntry> {
    guids
        .iter()
        .map(|g| FeedEntry::new(*g).with_title(format!("Episode {}", g)))
        .collect()
}

fn new_guids(engine: &EpisodeDiffEngine<MemoryMarkerStore>, entries: &[FeedEntry]) -> Vec<String> {
    engine
        .check_new_episodes(entries)
        .expect("Memory store never fails")
        .new_episodes
        .into_iter()
        .map(|e| e.guid)
        .collect()
}

#[test]
fn test_second_run_on_same_snapshot_finds_nothing() {
    let engine = EpisodeDiffEngine::new(MemoryMarkerStore::with_marker("E1"));
    let snapshot = feed(&["E3", "E2", "E1"]);

    assert_eq!(new_guids(&engine, &snapshot), vec!["E2", "E3"]);
    assert_eq!(engine.store().write_count(), 1);

    let second = engine.check_new_episodes(&snapshot).unwrap();
    assert!(!second.has_new_episodes());
    assert_eq!(second.next_marker, None);
    assert_eq!(engine.store().write_count(), 1);
}

#[test]
fn test_first_run_reports_only_newest_of_many() {
    let entries: Vec<FeedEntry> = (0..50)
        .rev()
        .map(|i| FeedEntry::new(format!("ep-{}", i)))
        .collect();
    let engine = EpisodeDiffEngine::new(MemoryMarkerStore::new());

    let outcome = engine.check_new_episodes(&entries).unwrap();

    assert_eq!(outcome.new_episodes.len(), 1);
    assert_eq!(outcome.new_episodes[0].guid, "ep-49");
    assert_eq!(engine.store().current_marker(), Some(Marker::new("ep-49")));
}

#[test]
fn test_new_entries_come_back_oldest_first() {
    let engine = EpisodeDiffEngine::new(MemoryMarkerStore::with_marker("E2"));
    let entries = feed(&["E6", "E5", "E4", "E3", "E2", "E1"]);

    let outcome = engine.check_new_episodes(&entries).unwrap();
    let guids: Vec<_> = outcome.new_episodes.iter().map(|e| e.guid.as_str()).collect();

    assert_eq!(guids, vec!["E3", "E4", "E5", "E6"]);
    assert_eq!(outcome.latest().map(|e| e.guid.as_str()), Some("E6"));
    assert_eq!(outcome.next_marker, Some(Marker::new("E6")));
}

#[test]
fn test_marker_on_second_entry_yields_one() {
    let entries = feed(&["E5", "E4", "E3", "E2", "E1"]);
    let outcome = diff_entries(&entries, Some(&Marker::new("E4")));

    assert_eq!(outcome.new_episodes.len(), 1);
    assert_eq!(outcome.new_episodes[0].guid, "E5");
}

#[test]
fn test_entry_without_identifier_is_skipped_and_does_not_stop_scan() {
    let entries = vec![
        FeedEntry::new("E4"),
        FeedEntry::without_guid().with_title("no guid"),
        FeedEntry::new("E3"),
        FeedEntry::new("E2"),
        FeedEntry::new("E1"),
    ];

    let outcome = diff_entries(&entries, Some(&Marker::new("E2")));
    let guids: Vec<_> = outcome.new_episodes.iter().map(|e| e.guid.as_str()).collect();

    assert_eq!(guids, vec!["E3", "E4"]);
    assert!(outcome.new_episodes.iter().all(|e| e.title != "no guid"));
}

#[test]
fn test_empty_feed_keeps_stored_marker() {
    let engine = EpisodeDiffEngine::new(MemoryMarkerStore::with_marker("E1"));

    let outcome = engine.check_new_episodes(&[]).unwrap();

    assert!(!outcome.has_new_episodes());
    assert_eq!(engine.store().write_count(), 0);
    assert_eq!(engine.store().current_marker(), Some(Marker::new("E1")));
}

#[test]
fn test_newest_equal_to_marker_is_not_resaved() {
    let engine = EpisodeDiffEngine::new(MemoryMarkerStore::with_marker("E3"));

    let outcome = engine.check_new_episodes(&feed(&["E3", "E2", "E1"])).unwrap();

    assert!(!outcome.has_new_episodes());
    assert_eq!(engine.store().write_count(), 0);
}

#[test]
fn test_detect_does_not_write() {
    let engine = EpisodeDiffEngine::new(MemoryMarkerStore::new());
    let entries = feed(&["E2", "E1"]);

    let outcome = engine.detect(&entries);
    assert!(outcome.has_new_episodes());
    assert_eq!(engine.store().write_count(), 0);

    assert!(engine.commit(&outcome).unwrap());
    assert_eq!(engine.store().current_marker(), Some(Marker::new("E2")));
}

#[test]
fn test_commit_without_update_is_noop() {
    let engine = EpisodeDiffEngine::new(MemoryMarkerStore::with_marker("E1"));
    let outcome = engine.detect(&feed(&["E1"]));

    assert!(!engine.commit(&outcome).unwrap());
    assert_eq!(engine.store().write_count(), 0);
}

#[test]
fn test_engine_over_borrowed_store() {
    let store = MemoryMarkerStore::with_marker("E1");
    let engine = EpisodeDiffEngine::new(&store);

    engine.check_new_episodes(&feed(&["E2", "E1"])).unwrap();

    assert_eq!(store.load_marker(), Some(Marker::new("E2")));
}

#[test]
fn test_episode_carries_entry_fields() {
    let entries = vec![FeedEntry::new("E1")
        .with_title("Hello")
        .with_url("https://stand.fm/episodes/1")];

    let outcome = diff_entries(&entries, None);
    let episode = &outcome.new_episodes[0];

    assert_eq!(episode.title, "Hello");
    assert_eq!(episode.url, "https://stand.fm/episodes/1");
    assert_eq!(episode.audio_url, None);
}
