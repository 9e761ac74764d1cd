//! Database-directory layout: filename parsing and classification of
//! `.data`/`.hnt` files by file-id.
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Extension used for data files.
pub const DATA_EXT: &str = "data";
/// Extension used for hint files.
pub const HINT_EXT: &str = "hnt";

/// The data and hint files discovered in a database directory, each paired
/// with its parsed file-id and sorted ascending by file-id (oldest first).
pub struct Layout {
    /// Discovered data files, `(file_id, path)`, ascending by file-id.
    pub data_files: Vec<(i64, PathBuf)>,
    /// Discovered hint files, `(file_id, path)`, ascending by file-id.
    pub hint_files: Vec<(i64, PathBuf)>,
}

/// Scans `dir` for `.data`/`.hnt` files, parsing each basename's file-id.
///
/// A file whose extension is neither `.data` nor `.hnt` is ignored. A
/// `.data`/`.hnt` file whose basename carries no digit run is skipped with a
/// warning logged by the caller — this function itself simply omits it from
/// the returned lists, since `store` stays fail-soft at this layer and lets
/// the facade decide how loudly to complain.
///
/// # Errors
///
/// Returns `CaskError::Io` if the directory cannot be read.
pub fn scan(dir: &Path) -> Result<Layout> {
    let mut data_files = Vec::new();
    let mut hint_files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e,
            None => continue,
        };
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s,
            None => continue,
        };
        let Some(file_id) = parse_file_id(stem) else {
            continue;
        };

        match ext {
            DATA_EXT => data_files.push((file_id, path)),
            HINT_EXT => hint_files.push((file_id, path)),
            _ => {}
        }
    }

    data_files.sort_by_key(|(id, _)| *id);
    hint_files.sort_by_key(|(id, _)| *id);

    Ok(Layout {
        data_files,
        hint_files,
    })
}

/// Extracts the largest contiguous run of ASCII digits in `stem` and parses
/// it as an `i64`. Returns `None` if `stem` carries no digits, or if the run
/// overflows `i64`.
#[must_use]
pub fn parse_file_id(stem: &str) -> Option<i64> {
    let bytes = stem.as_bytes();
    let mut best_start = 0;
    let mut best_len = 0;
    let mut cur_start = 0;
    let mut cur_len = 0;

    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            if cur_len == 0 {
                cur_start = i;
            }
            cur_len += 1;
            if cur_len > best_len {
                best_len = cur_len;
                best_start = cur_start;
            }
        } else {
            cur_len = 0;
        }
    }

    if best_len == 0 {
        return None;
    }

    stem[best_start..best_start + best_len].parse().ok()
}

/// Builds the path for a data file with the given file-id in `dir`.
#[must_use]
pub fn data_path(dir: &Path, file_id: i64) -> PathBuf {
    dir.join(format!("{file_id}.{DATA_EXT}"))
}

/// Builds the path for a hint file with the given file-id in `dir`.
#[must_use]
pub fn hint_path(dir: &Path, file_id: i64) -> PathBuf {
    dir.join(format!("{file_id}.{HINT_EXT}"))
}
