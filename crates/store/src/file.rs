//! Append-only writer and positioned reader over a single on-disk file.
//!
//! These two types are the only things in the crate that touch raw file
//! descriptors; everything above them (`datafile`, `hint`) works in terms of
//! offsets and byte slices.
use crate::error::{CaskError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::FileExt;
use std::path::Path;

/// Append-only writer over one file, tracking the next write offset.
///
/// Not internally synchronized: callers are responsible for serializing
/// appends to the same file (the facade does this with the active-file
/// write lock).
pub struct AppendWriter {
    file: File,
    offset: u64,
}

impl AppendWriter {
    /// Opens `path` for appending, creating it if absent.
    ///
    /// The starting offset is recovered from the file's current size, so
    /// resuming an existing active file picks up exactly where a prior
    /// process left off.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();
        Ok(Self { file, offset })
    }

    /// Appends `bytes` to the file, returning the offset at which the write
    /// started.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let start = self.offset;
        self.file.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(start)
    }

    /// Current write offset (equal to the file length).
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Flushes and `fsync`s the file.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all().map_err(CaskError::from)
    }
}

/// Positioned (`pread`) reader over one file descriptor.
///
/// Safe to use concurrently with an `AppendWriter` on the same underlying
/// file (a separate open of the same path) and across threads, since
/// `read_at` does not move a shared cursor.
pub struct PositionedReader {
    file: File,
}

impl PositionedReader {
    /// Opens `path` for positioned reads.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self { file })
    }

    /// Reads into `buf` starting at `offset`, returning the number of bytes
    /// actually read. A short read is not an error here — callers with a
    /// fixed-length contract turn a short result into `CaskError::ShortRead`
    /// themselves; callers scanning to EOF treat it as termination.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        loop {
            match self.file.read_at(&mut buf[total..], offset + total as u64) {
                Ok(0) => return Ok(total),
                Ok(n) => {
                    total += n;
                    if total == buf.len() {
                        return Ok(total);
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(CaskError::from(e)),
            }
        }
    }

    /// Reads exactly `buf.len()` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `CaskError::ShortRead` if fewer bytes were available.
    pub fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let n = self.read_at(offset, buf)?;
        if n != buf.len() {
            return Err(CaskError::ShortRead {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }
}
