use super::super::*;
use std::fs;
use std::time::Duration;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_create_timestamped_backup() {
    // Setup: Create a temp snapshot file
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shell.json");
    fs::write(&path, "{\"schema_id\":\"org.example\"}").unwrap();
    let backup_dir = temp_dir.path().join("backups");

    let backup_path = create_timestamped_backup(&path, &backup_dir).unwrap();

    // Verify: Backup file exists in the backup directory
    assert!(backup_path.exists(), "Backup file should exist");
    assert_eq!(backup_path.parent().unwrap(), backup_dir);

    // Verify: Filename format using chrono parsing
    let filename = backup_path.file_name().unwrap().to_str().unwrap();
    let parts: Vec<&str> = filename.split('.').collect();
    assert_eq!(parts.len(), 3, "Filename should have 3 parts: name.ext.timestamp");
    assert_eq!(parts[0], "shell");
    assert_eq!(parts[1], "json");

    let parsed = chrono::NaiveDateTime::parse_from_str(parts[2], "%Y-%m-%d_%H%M%S");
    assert!(parsed.is_ok(), "Timestamp should be valid chrono format: {}", parts[2]);

    // Verify: Backup content matches original
    assert_eq!(
        fs::read_to_string(&backup_path).unwrap(),
        "{\"schema_id\":\"org.example\"}"
    );
}

#[test]
fn test_multiple_backups_dont_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shell.json");
    let backup_dir = temp_dir.path().join("backups");

    fs::write(&path, "original content").unwrap();
    let backup1 = create_timestamped_backup(&path, &backup_dir).unwrap();

    // Wait 1 second to ensure different timestamp
    thread::sleep(Duration::from_secs(1));

    fs::write(&path, "modified content").unwrap();
    let backup2 = create_timestamped_backup(&path, &backup_dir).unwrap();

    assert_eq!(fs::read_to_string(&backup1).unwrap(), "original content");
    assert_eq!(fs::read_to_string(&backup2).unwrap(), "modified content");
}

#[test]
fn test_backup_of_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let result = create_timestamped_backup(
        &temp_dir.path().join("missing.json"),
        &temp_dir.path().join("backups"),
    );

    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_write_atomically_replaces_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("file.json");
    fs::write(&path, "old").unwrap();

    write_atomically(&path, "new").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
}
