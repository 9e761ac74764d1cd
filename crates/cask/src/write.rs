//! Write path: `insert()`, `delete()`, and rotation (`flush_active_file()`).
//!
//! Both `insert` and `delete` take only a *shared* lock on the file table:
//! the active [`DataFile`](store::DataFile) serializes its own appends
//! internally, so concurrent inserts do not block concurrent `get`s. Only
//! rotation needs the table's exclusive lock, to swap the active file and
//! publish the retiring one into the closed-files table as a single atomic
//! step — readers can never observe neither file.
use log::{debug, warn};

use store::{layout, DataFile, IndexEntry, Result};

use crate::{next_file_id, Cask};

impl Cask {
    /// Inserts `key` with `value`, overwriting any prior entry.
    ///
    /// # Errors
    ///
    /// Returns `CaskError::InvalidArgument` if the key or value length
    /// violates the record format's limits, or propagates an I/O error from
    /// the append.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let (file_id, value_pos) = {
            let files = self.files.read().expect("file table lock poisoned");
            let value_pos = files.active.insert(key, value)?;
            (files.active.file_id(), value_pos)
        };

        self.index.put(
            key.to_vec(),
            IndexEntry {
                file_id,
                value_pos,
                value_len: value.len() as u16,
            },
        );

        self.maybe_rotate()?;
        Ok(())
    }

    /// Deletes `key` by appending a tombstone record and removing it from
    /// the index. A no-op (still writes the tombstone) if the key was
    /// already absent, matching the facade's fire-and-forget delete
    /// contract — there is no `NotFound` on delete.
    ///
    /// # Errors
    ///
    /// Propagates an I/O error from the append.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        {
            let files = self.files.read().expect("file table lock poisoned");
            files.active.delete(key)?;
        }
        self.index.remove(key);
        self.maybe_rotate()?;
        Ok(())
    }

    /// Rotates the active file if it has grown past the configured
    /// threshold.
    fn maybe_rotate(&self) -> Result<()> {
        let should_rotate = {
            let files = self.files.read().expect("file table lock poisoned");
            files.active.size() >= self.rotation_threshold
        };
        if should_rotate {
            self.flush_active_file()?;
        }
        Ok(())
    }

    /// Retires the current active file into the closed-files table, opens a
    /// fresh active file, and — if hint mode is configured — writes a hint
    /// file summarizing the retired file.
    ///
    /// Takes the file table's exclusive lock for the whole rotation: readers
    /// and writers alike observe either the old active file (now reachable
    /// through the closed-files table) or the new one, never neither.
    ///
    /// # Errors
    ///
    /// Returns `CaskError::Io` if the new active file cannot be opened.
    /// Failure to write the hint file is logged, not propagated: a missing
    /// hint file only costs a future hint-mode recovery a fallback rescan.
    pub fn flush_active_file(&self) -> Result<()> {
        let mut files = self.files.write().expect("file table lock poisoned");

        files.active.sync()?;

        let old_id = files.active.file_id();
        let new_id = next_file_id(Some(old_id));
        let new_path = layout::data_path(&self.directory, new_id);
        let new_active = DataFile::open_active(
            &new_path,
            new_id,
            self.config.bloom_bits,
            self.config.bloom_hashes,
        )?;

        let mut retiring = std::mem::replace(&mut files.active, new_active);
        retiring.close();

        if self.config.hint_mode {
            let hint_path = layout::hint_path(&self.directory, old_id);
            match store::HintWriter::create(&hint_path) {
                Ok(mut writer) => {
                    if let Err(e) = retiring.write_hints(&mut writer) {
                        warn!("failed to write hint file {}: {e}", hint_path.display());
                    }
                }
                Err(e) => warn!("failed to create hint file {}: {e}", hint_path.display()),
            }
        }

        debug!("rotated active file {old_id} -> {new_id}");
        files.closed.insert(old_id, retiring);
        Ok(())
    }
}
