use crate::layout::{data_path, hint_path, parse_file_id, scan};
use std::fs::File;
use tempfile::tempdir;

#[test]
fn parse_file_id_extracts_largest_digit_run() {
    assert_eq!(parse_file_id("1690000000000"), Some(1_690_000_000_000));
    assert_eq!(parse_file_id("db-42-backup-7"), Some(42));
    assert_eq!(parse_file_id("no-digits-here"), None);
    assert_eq!(parse_file_id(""), None);
}

#[test]
fn data_path_and_hint_path_round_trip_through_parse() {
    let dir = tempdir().unwrap();
    let dp = data_path(dir.path(), 17);
    let hp = hint_path(dir.path(), 17);
    assert_eq!(dp.extension().unwrap(), "data");
    assert_eq!(hp.extension().unwrap(), "hnt");
    assert_eq!(
        parse_file_id(dp.file_stem().unwrap().to_str().unwrap()),
        Some(17)
    );
    assert_eq!(
        parse_file_id(hp.file_stem().unwrap().to_str().unwrap()),
        Some(17)
    );
}

#[test]
fn scan_classifies_and_sorts_by_file_id() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("30.data")).unwrap();
    File::create(dir.path().join("10.data")).unwrap();
    File::create(dir.path().join("20.data")).unwrap();
    File::create(dir.path().join("10.hnt")).unwrap();
    File::create(dir.path().join("readme.txt")).unwrap();

    let layout = scan(dir.path()).unwrap();
    let data_ids: Vec<i64> = layout.data_files.iter().map(|(id, _)| *id).collect();
    let hint_ids: Vec<i64> = layout.hint_files.iter().map(|(id, _)| *id).collect();

    assert_eq!(data_ids, vec![10, 20, 30]);
    assert_eq!(hint_ids, vec![10]);
}

#[test]
fn scan_skips_files_with_no_parseable_file_id() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("active.data")).unwrap();
    File::create(dir.path().join("5.data")).unwrap();

    let layout = scan(dir.path()).unwrap();
    let data_ids: Vec<i64> = layout.data_files.iter().map(|(id, _)| *id).collect();
    assert_eq!(data_ids, vec![5]);
}

#[test]
fn scan_empty_directory_returns_empty_layout() {
    let dir = tempdir().unwrap();
    let layout = scan(dir.path()).unwrap();
    assert!(layout.data_files.is_empty());
    assert!(layout.hint_files.is_empty());
}
