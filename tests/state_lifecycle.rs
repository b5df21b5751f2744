//! State file lifecycle across simulated crashes

use chrono::NaiveDate;
use concept_map::clock::StepClock;
use concept_map::model::Concept;
use concept_map::state::StateManager;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn manager(tmp: &TempDir) -> StateManager {
    let start = NaiveDate::from_ymd_opt(2025, 12, 5)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    StateManager::new(tmp.path().join("concepts_map.json"))
        .with_clock(Arc::new(StepClock::from_naive(start)))
}

#[test]
fn test_crash_before_replace_keeps_previous_state() {
    let tmp = TempDir::new().unwrap();
    let m = manager(&tmp);
    let mut store = m.initialize("demo");
    store.insert_if_absent(Concept::new("Decorators", "wrap"));
    assert!(m.save(&mut store));
    let good = fs::read_to_string(m.state_file()).unwrap();

    // A writer died after backing up and writing half of the temp file
    fs::create_dir_all(m.backup_dir()).unwrap();
    fs::copy(m.state_file(), m.backup_dir().join("concepts_map_20251205_093010.json")).unwrap();
    fs::write(m.temp_file(), "{\n  \"metadata\": {\n    \"proj").unwrap();

    assert_eq!(fs::read_to_string(m.state_file()).unwrap(), good);
    let loaded = m.load().unwrap().unwrap();
    assert_eq!(loaded, store);

    // The next save simply replaces the stale temp file
    store.insert_if_absent(Concept::new("Generators", "yield"));
    assert!(m.save(&mut store));
    assert!(!m.temp_file().exists());
    assert_eq!(m.load().unwrap().unwrap().concepts.len(), 2);
}

#[test]
fn test_reload_preserves_everything_but_timestamp() {
    let tmp = TempDir::new().unwrap();
    let m = manager(&tmp);
    let mut store = m.initialize("demo");
    let mut concept = Concept::new("Context Managers", "with-statement objects");
    concept.languages = vec!["python".to_string()];
    store.insert_if_absent(concept);

    let original = store.clone();
    assert!(m.save(&mut store));
    let loaded = m.load().unwrap().unwrap();

    assert_eq!(loaded.concepts, original.concepts);
    assert_eq!(loaded.metadata.project, original.metadata.project);
    assert_eq!(loaded.metadata.version, original.metadata.version);
    assert_eq!(loaded.metadata.created_at, original.metadata.created_at);
    assert_ne!(loaded.metadata.last_updated, original.metadata.last_updated);
}

#[test]
fn test_backups_are_restorable_documents() {
    let tmp = TempDir::new().unwrap();
    let m = manager(&tmp);
    let mut store = m.initialize("demo");

    for name in ["A", "B", "C"] {
        store.insert_if_absent(Concept::new(name, ""));
        assert!(m.save(&mut store));
    }

    let backups = m.backups().unwrap();
    assert_eq!(backups.len(), 2);

    // Newest backup is the state before the last save
    let restored = StateManager::new(backups.last().unwrap().clone())
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(restored.concepts.len(), 2);
}
