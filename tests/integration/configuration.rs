use std::fs;

use serde_json::{json, Value};
use tonic_telemetry::{
    config::{ConfigWarning, ConfigurationStore, FileStore, CONFIGURATION_KEY, CURRENT_SCHEMA_VERSION},
    WidgetType,
};

fn write_document(store: &FileStore, document: &Value) {
    fs::create_dir_all(store.dir()).unwrap();
    fs::write(store.path(CONFIGURATION_KEY), serde_json::to_vec(document).unwrap()).unwrap();
}

fn read_document(store: &FileStore) -> Value {
    serde_json::from_slice(&fs::read(store.path(CONFIGURATION_KEY)).unwrap()).unwrap()
}

#[test]
fn test_v1_file_is_migrated_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::new(dir.path());
    write_document(
        &files,
        &json!({
            "widgets": [
                { "type": "network", "isEnabled": true, "position": 0, "accentColor": "#123456" },
                { "type": "cpu", "isEnabled": false, "position": 1 }
            ]
        }),
    );

    let (store, warnings) = ConfigurationStore::load(Box::new(files.clone()));

    let network = store.get(WidgetType::Network).unwrap();
    assert_eq!(network.refresh_interval_seconds, 2.0);
    assert_eq!(network.accent_color, "#123456");
    assert_eq!(network.position, 0);
    assert!(!store.get(WidgetType::Cpu).unwrap().is_enabled);
    assert!(warnings.iter().all(|w| matches!(w, ConfigWarning::Normalized(_))));

    let migrated = read_document(&files);
    assert_eq!(migrated["schemaVersion"], json!(CURRENT_SCHEMA_VERSION));
    assert_eq!(migrated["widgets"][0]["moduleSettings"]["kind"], json!("network"));
    assert_eq!(migrated["widgets"].as_array().map(Vec::len), Some(WidgetType::ALL.len()));

    // Loading the migrated file again changes nothing
    let (again, warnings) = ConfigurationStore::load(Box::new(files.clone()));
    assert!(warnings.is_empty());
    assert_eq!(again.widgets(), store.widgets());
    assert_eq!(read_document(&files), migrated);
}

#[test]
fn test_corrupt_file_falls_back_until_next_change() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::new(dir.path());
    fs::write(files.path(CONFIGURATION_KEY), b"\x00\x01garbage").unwrap();

    let (mut store, warnings) = ConfigurationStore::load(Box::new(files.clone()));

    assert!(matches!(warnings.as_slice(), [ConfigWarning::Corrupt(_)]));
    assert_eq!(store.widgets().len(), WidgetType::ALL.len());
    assert_eq!(fs::read(files.path(CONFIGURATION_KEY)).unwrap(), b"\x00\x01garbage");

    store.update(WidgetType::Sensors, |sensors| sensors.is_enabled = true).unwrap();
    let (reloaded, warnings) = ConfigurationStore::load(Box::new(files));
    assert!(warnings.is_empty());
    assert!(reloaded.get(WidgetType::Sensors).unwrap().is_enabled);
}

#[test]
fn test_changes_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let files = FileStore::new(dir.path().join("tonic"));

    let (mut store, _) = ConfigurationStore::load(Box::new(files.clone()));
    store.update(WidgetType::Disk, |disk| disk.refresh_interval_seconds = 12.5).unwrap();
    store.reorder(WidgetType::Disk, 0).unwrap();
    drop(store);

    let (store, _) = ConfigurationStore::load(Box::new(files));
    let disk = store.get(WidgetType::Disk).unwrap();
    assert_eq!(disk.refresh_interval_seconds, 12.5);
    assert_eq!(disk.position, 0);
    assert_eq!(store.widgets()[0].widget_type, WidgetType::Disk);
}
