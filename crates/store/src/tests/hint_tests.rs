use crate::hint::{parse_hint_file, HintWriter};
use crate::index::Index;
use bloom::BloomFilter;
use format::TOMBSTONE;
use tempfile::tempdir;

fn test_bloom() -> BloomFilter {
    BloomFilter::new(1000, 5)
}

#[test]
fn parse_hint_file_rebuilds_live_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("1.hnt");
    {
        let mut w = HintWriter::create(&path).unwrap();
        w.write_hint(b"a", 5, 10).unwrap();
        w.write_hint(b"b", 6, 20).unwrap();
    }

    let index = Index::new(4);
    let mut bloom = test_bloom();
    parse_hint_file(&path, 1, &index, &mut bloom).unwrap();

    let entry_a = index.get(b"a").unwrap();
    assert_eq!(entry_a.file_id, 1);
    assert_eq!(entry_a.value_pos, 10);
    assert_eq!(entry_a.value_len, 5);

    let entry_b = index.get(b"b").unwrap();
    assert_eq!(entry_b.value_pos, 20);
    assert_eq!(entry_b.value_len, 6);

    assert!(bloom.may_contain(b"a"));
    assert!(bloom.may_contain(b"b"));
}

#[test]
fn parse_hint_file_honors_tombstone_hints() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("1.hnt");
    {
        let mut w = HintWriter::create(&path).unwrap();
        w.write_hint(b"a", 5, 10).unwrap();
        w.write_hint(b"a", TOMBSTONE, 0).unwrap();
    }

    let index = Index::new(4);
    let mut bloom = test_bloom();
    parse_hint_file(&path, 1, &index, &mut bloom).unwrap();

    assert!(index.get(b"a").is_none());
}

#[test]
fn ascending_file_id_parse_order_lets_newer_hints_shadow_older() {
    let dir = tempdir().unwrap();
    let old_path = dir.path().join("1.hnt");
    let new_path = dir.path().join("2.hnt");
    {
        let mut w = HintWriter::create(&old_path).unwrap();
        w.write_hint(b"a", 5, 10).unwrap();
    }
    {
        let mut w = HintWriter::create(&new_path).unwrap();
        w.write_hint(b"a", 9, 99).unwrap();
    }

    let index = Index::new(4);
    let mut bloom = test_bloom();
    parse_hint_file(&old_path, 1, &index, &mut bloom).unwrap();
    parse_hint_file(&new_path, 2, &index, &mut bloom).unwrap();

    let entry = index.get(b"a").unwrap();
    assert_eq!(entry.file_id, 2);
    assert_eq!(entry.value_pos, 99);
}

#[test]
fn parse_hint_file_terminates_cleanly_on_truncated_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("1.hnt");
    {
        let mut w = HintWriter::create(&path).unwrap();
        w.write_hint(b"a", 5, 10).unwrap();
        w.write_hint(b"bb", 6, 20).unwrap();
    }

    let full_len = std::fs::metadata(&path).unwrap().len();
    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(full_len - 1).unwrap();
    drop(file);

    let index = Index::new(4);
    let mut bloom = test_bloom();
    parse_hint_file(&path, 1, &index, &mut bloom).unwrap();

    assert!(index.get(b"a").is_some());
    assert!(index.get(b"bb").is_none());
}
