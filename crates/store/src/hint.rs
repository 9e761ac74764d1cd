//! Hint files: compact `.hnt` sidecars summarizing a closed data file, so
//! recovery can rebuild the index without rescanning every byte of data.
use crate::error::Result;
use crate::file::{AppendWriter, PositionedReader};
use crate::index::{Index, IndexEntry};
use bloom::BloomFilter;
use format::{HintHeader, HINT_HEADER_LEN};
use std::path::Path;

/// Writer for a hint file, opened once a data file has been retired from
/// active duty. Each call syncs immediately: hint files are written once,
/// at closure, never on the hot write path.
pub struct HintWriter {
    writer: AppendWriter,
}

impl HintWriter {
    /// Opens (creating) the hint file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            writer: AppendWriter::open(path)?,
        })
    }

    /// Appends one hint record and syncs.
    ///
    /// Pass `value_len = format::TOMBSTONE` to record a deletion: a later
    /// hint-mode recovery must still see the tombstone, or it could
    /// resurrect a key whose only remaining trace is an older file's hint.
    pub fn write_hint(&mut self, key: &[u8], value_len: u16, value_pos: u32) -> Result<()> {
        let record = format::encode_hint_record(key, value_len, value_pos)?;
        self.writer.append(&record)?;
        self.writer.sync()?;
        Ok(())
    }
}

/// Parses every hint record in the file at `path`, applying each to `index`
/// and re-adding every encountered key (live or tombstone) to `bloom`.
///
/// Live entries are inserted; tombstone entries remove the key. Terminates
/// without error on a truncated header or key (the same crash-consistency
/// contract as [`crate::datafile::DataFile::populate_index`]).
///
/// Callers are responsible for parsing hint files in ascending file-id order
/// so that entries from newer files correctly shadow older ones.
pub fn parse_hint_file<P: AsRef<Path>>(
    path: P,
    file_id: i64,
    index: &Index,
    bloom: &mut BloomFilter,
) -> Result<()> {
    let reader = PositionedReader::open(path)?;
    let mut offset: u64 = 0;
    let mut header_buf = [0u8; HINT_HEADER_LEN];

    loop {
        let n = reader.read_at(offset, &mut header_buf)?;
        if n < HINT_HEADER_LEN {
            break;
        }

        let header = HintHeader::parse(&header_buf)?;
        let key_len = header.key_len();
        let key_start = offset + HINT_HEADER_LEN as u64;

        let mut key = vec![0u8; key_len as usize];
        let n = reader.read_at(key_start, &mut key)?;
        if n < key.len() {
            break;
        }

        bloom.insert(&key);

        if header.is_tombstone() {
            index.remove(&key);
        } else {
            index.put(
                key,
                IndexEntry {
                    file_id,
                    value_pos: header.value_pos(),
                    value_len: header.value_len(),
                },
            );
        }

        offset = key_start + key_len as u64;
    }

    Ok(())
}
