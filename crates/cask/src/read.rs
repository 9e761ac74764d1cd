//! Read path: `get()`.
//!
//! A lookup is an index hit followed by exactly one positioned read: no
//! file is ever scanned or bloom-checked on this path, since the index
//! already resolves the exact `(file_id, value_pos, value_len)` an entry
//! lives at. Each `DataFile`'s bloom filter (§4.2) exists as a primitive for
//! callers that *don't* have the index in hand — an external compactor
//! deciding whether a given file is worth scanning at all — not for the
//! facade's own point lookups.
use store::CaskError;
use store::Result;

use crate::Cask;

impl Cask {
    /// Looks up `key`'s current value.
    ///
    /// # Errors
    ///
    /// Returns `CaskError::NotFound` if the key has no live entry.
    /// `CaskError::Internal` if the index names a file-id this database has
    /// never seen — an invariant violation, not a normal miss. Propagates
    /// `CaskError::ShortRead`/`CaskError::Io` from the underlying read.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let entry = self.index.get(key).ok_or(CaskError::NotFound)?;

        let files = self.files.read().expect("file table lock poisoned");

        if files.active.file_id() == entry.file_id {
            return files.active.find_by_position(entry.value_pos, entry.value_len);
        }

        let closed = files.closed.get(&entry.file_id).ok_or_else(|| {
            CaskError::Internal(format!(
                "index entry references unregistered file-id {}",
                entry.file_id
            ))
        })?;

        closed.find_by_position(entry.value_pos, entry.value_len)
    }
}
