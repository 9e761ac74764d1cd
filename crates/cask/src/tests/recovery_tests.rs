use std::fs;

use tempfile::tempdir;

use crate::{Cask, Config};

#[test]
fn data_survives_close_and_reopen() {
    let dir = tempdir().unwrap();

    {
        let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
        cask.insert(b"a", b"1").unwrap();
        cask.insert(b"b", b"2").unwrap();
        cask.delete(b"a").unwrap();
    }

    let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
    assert!(cask.get(b"a").is_err());
    assert_eq!(cask.get(b"b").unwrap(), b"2".to_vec());
}

#[test]
fn data_survives_reopen_across_a_rotation() {
    let dir = tempdir().unwrap();

    {
        let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
        cask.insert(b"old", b"v1").unwrap();
        cask.flush_active_file().unwrap();
        cask.insert(b"new", b"v2").unwrap();
    }

    let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
    assert_eq!(cask.get(b"old").unwrap(), b"v1".to_vec());
    assert_eq!(cask.get(b"new").unwrap(), b"v2".to_vec());
    assert_eq!(cask.len(), 2);
}

#[test]
fn reopen_assigns_a_file_id_newer_than_any_recovered_file() {
    let dir = tempdir().unwrap();

    {
        let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
        cask.insert(b"a", b"1").unwrap();
        cask.flush_active_file().unwrap();
    }

    let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
    cask.insert(b"b", b"2").unwrap();
    assert_eq!(cask.get(b"a").unwrap(), b"1".to_vec());
    assert_eq!(cask.get(b"b").unwrap(), b"2".to_vec());
}

#[test]
fn hint_mode_and_rescan_mode_recover_identical_state() {
    let scan_dir = tempdir().unwrap();
    let hint_dir = tempdir().unwrap();

    for (dir, hint_mode) in [(scan_dir.path(), false), (hint_dir.path(), true)] {
        let cask = Cask::open(dir, Config::new(dir).with_hint_mode(hint_mode)).unwrap();
        for i in 0..50u32 {
            let key = format!("k{i:03}").into_bytes();
            cask.insert(&key, format!("v{i}").as_bytes()).unwrap();
        }
        cask.delete(b"k010").unwrap();
        cask.flush_active_file().unwrap();
        cask.insert(b"k010", b"resurrected").unwrap();
    }

    let scan_recovered = Cask::open(scan_dir.path(), Config::new(scan_dir.path())).unwrap();
    let hint_recovered = Cask::open(
        hint_dir.path(),
        Config::new(hint_dir.path()).with_hint_mode(true),
    )
    .unwrap();

    assert_eq!(scan_recovered.len(), hint_recovered.len());
    for i in 0..50u32 {
        let key = format!("k{i:03}").into_bytes();
        assert_eq!(
            scan_recovered.get(&key).ok(),
            hint_recovered.get(&key).ok(),
            "key {key:?} should recover to the same state in both modes"
        );
    }
}

#[test]
fn hint_mode_recovery_still_works_when_hint_file_is_missing() {
    let dir = tempdir().unwrap();

    {
        let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
        cask.insert(b"a", b"1").unwrap();
        cask.flush_active_file().unwrap();
    }

    // No hint file was ever written (hint_mode was off), but opening with
    // hint_mode on should fall back to rescanning the data file directly.
    let cask = Cask::open(
        dir.path(),
        Config::new(dir.path()).with_hint_mode(true),
    )
    .unwrap();
    assert_eq!(cask.get(b"a").unwrap(), b"1".to_vec());
}

#[test]
fn recovery_skips_a_truncated_trailing_record() {
    let dir = tempdir().unwrap();

    {
        let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
        cask.insert(b"a", b"1").unwrap();
        cask.insert(b"b", b"2").unwrap();
    }

    let data_path = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.path().extension().and_then(|s| s.to_str()) == Some("data"))
        .expect("expected one data file")
        .path();

    // Truncate away the trailing bytes of the last record, simulating a
    // crash mid-append.
    let full = fs::read(&data_path).unwrap();
    fs::write(&data_path, &full[..full.len() - 1]).unwrap();

    let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
    assert_eq!(cask.get(b"a").unwrap(), b"1".to_vec());
    assert!(cask.get(b"b").is_err(), "truncated record should not be recovered");
}

#[test]
fn recovery_skips_an_unreadable_data_file_without_failing_open() {
    let dir = tempdir().unwrap();

    {
        let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
        cask.insert(b"a", b"1").unwrap();
        cask.flush_active_file().unwrap();
        cask.insert(b"b", b"2").unwrap();
        cask.flush_active_file().unwrap();
    }

    let data_files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("data"))
        .map(|e| e.path())
        .collect();
    assert!(data_files.len() >= 2);

    // Corrupt one closed data file's header byte so it can't be parsed at
    // all; recovery should log and skip it rather than failing Cask::open.
    let victim = &data_files[0];
    fs::write(victim, b"\xff\xff\xff\xff").unwrap();

    let cask = Cask::open(dir.path(), Config::new(dir.path()));
    assert!(cask.is_ok(), "a single corrupt file should not fail open");
}

#[test]
fn opening_a_fresh_directory_starts_empty() {
    let dir = tempdir().unwrap();
    let cask = Cask::open(dir.path(), Config::new(dir.path())).unwrap();
    assert!(cask.is_empty());
}
