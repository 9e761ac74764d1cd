//! A single `.data` file: a positioned reader, an optional append writer
//! (present only on the active file), and the per-file bloom filter built
//! from its keys.
//!
//! Internally synchronized so that a `DataFile` can be shared behind a
//! single `RwLock` at the facade level without that lock having to be held
//! for the duration of an append: the writer and bloom filter each carry
//! their own lock, and the reader needs none (`pread` is cursor-independent).
//! This lets `Cask::get` take only a *shared* lock on the file table while
//! `Cask::insert` appends to the active file — the file table's own lock is
//! only ever taken exclusively during rotation (`flush_active_file`).
use crate::error::{CaskError, Result};
use crate::file::{AppendWriter, PositionedReader};
use crate::index::{Index, IndexEntry};
use bloom::BloomFilter;
use format::{DataHeader, DATA_HEADER_LEN};
use std::path::Path;
use std::sync::{Mutex, RwLock, RwLockReadGuard};

/// One data file, reachable either for appends (the active file) or for
/// reads only (a closed file).
pub struct DataFile {
    reader: PositionedReader,
    writer: Option<Mutex<AppendWriter>>,
    bloom: RwLock<BloomFilter>,
    file_id: i64,
}

impl DataFile {
    /// Opens `path` as the active data file: both readable and appendable.
    pub fn open_active<P: AsRef<Path>>(
        path: P,
        file_id: i64,
        bloom_bits: u64,
        bloom_hashes: u32,
    ) -> Result<Self> {
        let path = path.as_ref();
        let writer = AppendWriter::open(path)?;
        let reader = PositionedReader::open(path)?;
        Ok(Self {
            reader,
            writer: Some(Mutex::new(writer)),
            bloom: RwLock::new(BloomFilter::new(bloom_bits, bloom_hashes)),
            file_id,
        })
    }

    /// Opens `path` as a closed (read-only) data file.
    pub fn open_closed<P: AsRef<Path>>(
        path: P,
        file_id: i64,
        bloom_bits: u64,
        bloom_hashes: u32,
    ) -> Result<Self> {
        let reader = PositionedReader::open(path)?;
        Ok(Self {
            reader,
            writer: None,
            bloom: RwLock::new(BloomFilter::new(bloom_bits, bloom_hashes)),
            file_id,
        })
    }

    /// This file's identifier.
    #[must_use]
    pub fn file_id(&self) -> i64 {
        self.file_id
    }

    /// `true` if this file still has an attached writer.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// A read guard over this file's bloom filter, for lookup
    /// short-circuiting. Dropped at the end of the caller's expression, so
    /// `df.bloom().may_contain(key)` does not hold the lock beyond the call.
    #[must_use]
    pub fn bloom(&self) -> RwLockReadGuard<'_, BloomFilter> {
        self.bloom.read().expect("bloom lock poisoned")
    }

    /// Drops this file's writer, if any, so it can no longer accept
    /// appends. Irreversible: a `DataFile` never regains a writer once
    /// closed.
    pub fn close(&mut self) {
        self.writer = None;
    }

    /// Current size of this file in bytes, as tracked by the append writer.
    /// `0` for a closed file (rotation decisions only ever examine the
    /// active file, so a closed file's size is never needed).
    #[must_use]
    pub fn size(&self) -> u64 {
        self.writer
            .as_ref()
            .map(|w| w.lock().expect("writer lock poisoned").offset())
            .unwrap_or(0)
    }

    /// Appends a live key/value record, returning the absolute offset at
    /// which the value payload begins.
    ///
    /// # Errors
    ///
    /// Returns `CaskError::Internal` if this file has no writer (it is
    /// closed), or propagates any encode/IO error.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<u32> {
        self.append_record(key, Some(value))
    }

    /// Appends a tombstone record for `key`.
    ///
    /// # Errors
    ///
    /// Same as [`DataFile::insert`].
    pub fn delete(&self, key: &[u8]) -> Result<u32> {
        self.append_record(key, None)
    }

    fn append_record(&self, key: &[u8], value: Option<&[u8]>) -> Result<u32> {
        let writer_lock = self
            .writer
            .as_ref()
            .ok_or_else(|| CaskError::Internal("insert on a closed data file".to_string()))?;

        let record = format::encode_data_record(key, value)?;
        let start = {
            let mut writer = writer_lock.lock().expect("writer lock poisoned");
            let start = writer.append(&record)?;
            writer.sync()?;
            start
        };
        self.bloom.write().expect("bloom lock poisoned").insert(key);

        let value_pos = start + DATA_HEADER_LEN as u64 + key.len() as u64;
        Ok(value_pos as u32)
    }

    /// Final `sync()` of the writer, called when retiring this file from
    /// active duty.
    pub fn sync(&self) -> Result<()> {
        if let Some(writer_lock) = self.writer.as_ref() {
            writer_lock.lock().expect("writer lock poisoned").sync()?;
        }
        Ok(())
    }

    /// Reads exactly `value_len` bytes starting at `value_pos`.
    ///
    /// # Errors
    ///
    /// Returns `CaskError::ShortRead` if fewer bytes were available.
    pub fn find_by_position(&self, value_pos: u32, value_len: u16) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; value_len as usize];
        self.reader.read_exact_at(u64::from(value_pos), &mut buf)?;
        Ok(buf)
    }

    /// Rebuilds index entries for every key in this file, from offset 0.
    ///
    /// Terminates silently on a truncated header or body (a crash mid-append
    /// leaves a partial record at the tail of the active file). Tombstones
    /// remove the key from the index; live records overwrite any earlier
    /// entry for the same key, so the last occurrence in append order wins.
    /// Every encountered key, live or tombstone, is re-added to this file's
    /// bloom filter.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors; a malformed (but not merely truncated) header
    /// is treated as `CaskError::Internal`.
    pub fn populate_index(&self, index: &Index) -> Result<()> {
        let file_id = self.file_id;
        self.scan_records(|key, is_tombstone, value_pos, value_len| {
            if is_tombstone {
                index.remove(key);
            } else {
                index.put(
                    key.to_vec(),
                    IndexEntry {
                        file_id,
                        value_pos,
                        value_len,
                    },
                );
            }
        })
    }

    /// Parses the hint file at `hint_path` (a sidecar previously written for
    /// this same file-id), applying its entries to `index` and repopulating
    /// this file's bloom filter from the hint's keys.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the hint-file scan.
    pub fn apply_hint_file<P: AsRef<Path>>(&self, hint_path: P, index: &Index) -> Result<()> {
        let mut bloom = self.bloom.write().expect("bloom lock poisoned");
        crate::hint::parse_hint_file(hint_path, self.file_id, index, &mut bloom)
    }

    /// Writes one hint record per key encountered in this file, reflecting
    /// this file's own last-writer-wins state (a key tombstoned later in the
    /// same file is written as a tombstone hint, not dropped).
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the scan or from the hint writer.
    pub fn write_hints(&self, writer: &mut crate::hint::HintWriter) -> Result<()> {
        let mut last: std::collections::HashMap<Vec<u8>, Option<(u32, u16)>> =
            std::collections::HashMap::new();
        let mut order: Vec<Vec<u8>> = Vec::new();

        self.scan_records(|key, is_tombstone, value_pos, value_len| {
            if !last.contains_key(key) {
                order.push(key.to_vec());
            }
            last.insert(
                key.to_vec(),
                if is_tombstone {
                    None
                } else {
                    Some((value_pos, value_len))
                },
            );
        })?;

        for key in order {
            match last.get(&key).and_then(|v| *v) {
                Some((value_pos, value_len)) => writer.write_hint(&key, value_len, value_pos)?,
                None => writer.write_hint(&key, format::TOMBSTONE, 0)?,
            }
        }

        Ok(())
    }

    /// Scans every record in this file from offset 0, calling `visit(key,
    /// is_tombstone, value_pos, value_len)` for each one, in append order.
    /// Also re-adds every encountered key to this file's bloom filter.
    ///
    /// A truncated header, key, or value at the tail of the file silently
    /// terminates the scan, matching append-crash semantics: there is no
    /// per-record checksum, so a short read is indistinguishable from "the
    /// writer was interrupted here" and is not an error.
    fn scan_records<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], bool, u32, u16),
    {
        let mut offset: u64 = 0;
        let mut header_buf = [0u8; DATA_HEADER_LEN];

        loop {
            let n = self.reader.read_at(offset, &mut header_buf)?;
            if n < DATA_HEADER_LEN {
                break;
            }

            let header = DataHeader::parse(&header_buf)?;
            let key_len = header.key_len();
            if key_len == 0 || key_len as usize > format::MAX_KEY_LEN {
                return Err(CaskError::Internal(format!(
                    "corrupt data file {}: invalid key length {key_len} at offset {}",
                    self.file_id, offset
                )));
            }

            let mut key = vec![0u8; key_len as usize];
            let key_start = offset + DATA_HEADER_LEN as u64;
            let n = self.reader.read_at(key_start, &mut key)?;
            if n < key.len() {
                break;
            }

            self.bloom.write().expect("bloom lock poisoned").insert(&key);

            let is_tombstone = header.is_tombstone();
            let value_len = header.value_len();
            let value_pos = key_start + key.len() as u64;

            if is_tombstone {
                visit(&key, true, value_pos as u32, value_len);
                offset = value_pos;
            } else {
                // Confirm the value bytes are actually present before
                // reporting this record; a truncated value at the tail
                // means this was the crash point.
                let mut probe = vec![0u8; value_len as usize];
                let n = self.reader.read_at(value_pos, &mut probe)?;
                if n < probe.len() {
                    break;
                }
                visit(&key, false, value_pos as u32, value_len);
                offset = value_pos + u64::from(value_len);
            }
        }

        Ok(())
    }
}
