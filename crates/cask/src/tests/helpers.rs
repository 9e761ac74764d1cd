use std::fs;
use std::path::Path;

/// Counts files with the given extension directly inside `dir`.
pub fn count_files_with_ext(dir: &Path, ext: &str) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|found| found == ext)
                .unwrap_or(false)
        })
        .count()
}

pub fn count_data_files(dir: &Path) -> usize {
    count_files_with_ext(dir, "data")
}

pub fn count_hint_files(dir: &Path) -> usize {
    count_files_with_ext(dir, "hnt")
}
