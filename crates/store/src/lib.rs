//! # Store — Bitcask-discipline file and index primitives
//!
//! The on-disk and in-memory building blocks underneath the [`cask`]
//! facade: append-only writers, positioned readers, data files, hint files,
//! the sharded key index, and directory layout parsing.
//!
//! ## Module Responsibilities
//!
//! | Module     | Purpose                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`file`]   | `AppendWriter`, `PositionedReader` — raw file access       |
//! | [`datafile`] | `DataFile` — one `.data` file: writer + reader + bloom   |
//! | [`hint`]   | `HintWriter`, `parse_hint_file` — `.hnt` sidecar handling  |
//! | [`index`]  | `Index` — sharded concurrent key → location map            |
//! | [`layout`] | Directory scanning and file-id parsing                    |
//! | [`error`]  | `CaskError`, shared `Result` alias                         |
//!
//! [`cask`]: https://docs.rs/cask
pub mod datafile;
pub mod error;
pub mod file;
pub mod hint;
pub mod index;
pub mod layout;

pub use datafile::DataFile;
pub use error::{CaskError, Result};
pub use file::{AppendWriter, PositionedReader};
pub use hint::{parse_hint_file, HintWriter};
pub use index::{Index, IndexEntry};
pub use layout::{scan, Layout};

#[cfg(test)]
mod tests;
