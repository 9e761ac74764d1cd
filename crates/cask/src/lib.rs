//! # Cask — embeddable Bitcask-style key-value store
//!
//! The facade that ties together [`store`]'s file and index primitives into
//! a complete append-only storage engine.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                    CASK                        │
//! │                                                 │
//! │ write.rs → append to active .data file          │
//! │              |                                  │
//! │              |  (size threshold exceeded?)      │
//! │              |            yes                   │
//! │              v                                  │
//! │     flush_active_file() → retire, rotate,       │
//! │                            write .hnt if enabled│
//! │                                                  │
//! │ read.rs → index lookup → positioned read         │
//! │            from the owning .data file           │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module        | Purpose                                               |
//! |--------------|---------------------------------------------------------|
//! | [`lib.rs`]   | `Cask` struct, constructor, accessors, `Debug`, `Drop`   |
//! | [`recovery`] | Directory scan, hint/data-file replay into the index     |
//! | [`write`]    | `insert()`, `delete()`, `flush_active_file()`            |
//! | [`read`]     | `get()`                                                  |
//!
//! ## Crash Safety
//!
//! Every write is a single append to the active data file, synced before the
//! call returns. There is no separate write-ahead log: the data file *is*
//! the log. Recovery rescans (or, in hint mode, replays hint sidecars for)
//! every data file in ascending file-id order, so the last record written
//! for a key always wins.
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

mod read;
mod recovery;
mod write;

pub use config::Config;
pub use store::{CaskError, Result};

use store::{layout, DataFile, Index};

/// Maximum allowed key size in bytes (255, the record format's own limit).
pub const MAX_KEY_SIZE: usize = format::MAX_KEY_LEN;
/// Maximum allowed value size in bytes (64 KiB, the record format's own limit).
pub const MAX_VALUE_SIZE: usize = u16::MAX as usize - 1;

/// Default size, in bytes, of the active file before it is rotated.
pub const DEFAULT_ROTATION_THRESHOLD: u64 = 16 * 1024 * 1024;

/// The active writer plus the table of closed, read-only files. Held behind
/// a single lock: readers take a shared lock, writers (insert, delete, and
/// rotation) take an exclusive one.
pub(crate) struct FileTable {
    pub(crate) active: DataFile,
    pub(crate) closed: HashMap<i64, DataFile>,
}

/// An open Bitcask-style database directory.
///
/// # Write Path
///
/// 1. Take the file table's exclusive lock.
/// 2. Append the record to the active data file.
/// 3. Release the lock, then update the key index.
/// 4. If the active file has grown past the rotation threshold, flush it.
///
/// # Read Path
///
/// 1. Look the key up in the index; `CaskError::NotFound` if absent.
/// 2. Take the file table's shared lock, resolve the entry's file id to
///    either the active file or a closed one.
/// 3. Read the value at the recorded position.
///
/// # Recovery
///
/// On [`Cask::open`], every existing data file in the directory is replayed
/// into a fresh index — via hint files when `config.hint_mode` is set and a
/// hint file is present, otherwise by rescanning the data file directly.
pub struct Cask {
    pub(crate) directory: PathBuf,
    pub(crate) config: Config,
    pub(crate) files: RwLock<FileTable>,
    pub(crate) index: Index,
    pub(crate) rotation_threshold: u64,
}

impl std::fmt::Debug for Cask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("Cask")
            .field("directory", &self.directory)
            .field("hint_mode", &self.config.hint_mode)
            .field("active_file_id", &files.active.file_id())
            .field("closed_file_count", &files.closed.len())
            .field("index_len", &self.index.len())
            .field("rotation_threshold", &self.rotation_threshold)
            .finish()
    }
}

impl Cask {
    /// Opens (creating if necessary) a database directory, recovering the
    /// key index from whatever data and hint files are already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, or if opening
    /// the newly allocated active file fails.
    pub fn open<P: AsRef<Path>>(directory: P, config: Config) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;

        let index = Index::new(config.index_shards);
        let recovered = recovery::recover(&directory, &config, &index)?;

        let new_id = next_file_id(recovered.max_id);
        let active_path = layout::data_path(&directory, new_id);
        let active = DataFile::open_active(
            &active_path,
            new_id,
            config.bloom_bits,
            config.bloom_hashes,
        )?;

        Ok(Self {
            directory,
            config,
            files: RwLock::new(FileTable {
                active,
                closed: recovered.closed,
            }),
            index,
            rotation_threshold: DEFAULT_ROTATION_THRESHOLD,
        })
    }

    /// The directory this database is rooted at.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `true` if this database recovers via hint files rather than
    /// rescanning data files directly.
    #[must_use]
    pub fn hint_mode(&self) -> bool {
        self.config.hint_mode
    }

    /// The number of live keys currently in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// `true` if the index holds no live keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The byte-size threshold above which a write triggers rotation of the
    /// active file.
    #[must_use]
    pub fn rotation_threshold(&self) -> u64 {
        self.rotation_threshold
    }

    /// Overrides the rotation threshold. Useful for tests or runtime tuning.
    pub fn set_rotation_threshold(&mut self, threshold: u64) {
        self.rotation_threshold = threshold;
    }

    /// Explicitly syncs the active file and releases it.
    ///
    /// Every write already syncs before returning, so this mostly matters
    /// for callers that want a synchronous handle on durability before
    /// dropping the handle (e.g. a CLI's `EXIT` command) rather than relying
    /// on `Drop`'s best-effort final sync. Safe to call more than once, and
    /// safe to skip — `Drop` performs the same sync if this is never called.
    ///
    /// # Errors
    ///
    /// Propagates an I/O error from the final sync.
    pub fn close(&self) -> Result<()> {
        let files = self.files.read().expect("file table lock poisoned");
        files.active.sync()
    }
}

/// Picks the next file id strictly greater than any recovered id, biased
/// towards the current wall clock so that ids remain roughly
/// chronologically ordered across process restarts.
fn next_file_id(max_recovered_id: Option<i64>) -> i64 {
    let now_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    match max_recovered_id {
        Some(max_id) => now_millis.max(max_id + 1),
        None => now_millis,
    }
}

/// Best-effort sync on drop. Every write already syncs before returning, so
/// this is a final safety net, not the primary durability mechanism; any
/// error here is silently ignored since `Drop` cannot propagate one.
impl Drop for Cask {
    fn drop(&mut self) {
        if let Ok(mut files) = self.files.write() {
            if let Err(e) = files.active.sync() {
                warn!("final sync of active file failed on drop: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests;
