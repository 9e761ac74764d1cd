//! Startup recovery: directory scan, hint/data-file replay into a fresh
//! index, and reconstruction of the closed-files table.
use log::warn;
use std::collections::HashMap;

use config::Config;
use store::{layout, DataFile, Index, Result};

/// A data file opened for recovery, paired with whether a matching hint
/// file was actually applied to it.
pub struct Recovered {
    /// Every discovered data file, keyed by file-id, opened read-only and
    /// ready to install into the facade's closed-files table.
    pub closed: HashMap<i64, DataFile>,
    /// The largest file-id discovered, or `None` if the directory held no
    /// data files yet.
    pub max_id: Option<i64>,
}

/// Replays every existing data/hint file in `directory` into `index`,
/// returning the opened closed files and the highest file-id discovered.
///
/// A single corrupt file is logged and skipped rather than aborting the
/// whole recovery (fail-soft at open, per the facade's contract); only a
/// directory-level error (cannot enumerate `directory`) propagates.
pub fn recover(directory: &std::path::Path, config: &Config, index: &Index) -> Result<Recovered> {
    let layout = layout::scan(directory)?;

    let max_id = layout.data_files.iter().map(|(id, _)| *id).max();
    let mut closed = HashMap::with_capacity(layout.data_files.len());

    let hint_paths: HashMap<i64, &std::path::PathBuf> =
        layout.hint_files.iter().map(|(id, path)| (*id, path)).collect();

    // Ascending file-id order (`layout::scan` already sorts both lists) so
    // that later files' entries correctly shadow earlier ones in the index.
    for (file_id, data_path) in &layout.data_files {
        let data_file =
            match DataFile::open_closed(data_path, *file_id, config.bloom_bits, config.bloom_hashes)
            {
                Ok(df) => df,
                Err(e) => {
                    warn!("failed to open data file {}: {e}", data_path.display());
                    continue;
                }
            };

        let used_hint = config.hint_mode
            && hint_paths.get(file_id).is_some_and(|hint_path| {
                match data_file.apply_hint_file(hint_path, index) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("skipping corrupt hint file {}: {e}", hint_path.display());
                        false
                    }
                }
            });

        if !used_hint {
            if let Err(e) = data_file.populate_index(index) {
                warn!("skipping corrupt data file {}: {e}", data_path.display());
            }
        }

        closed.insert(*file_id, data_file);
    }

    Ok(Recovered { closed, max_id })
}
