//! # Config — runtime configuration for the storage engine
//!
//! A plain struct with defaults and a small builder, parsed either
//! programmatically ([`Config::new`]) or from the environment
//! ([`Config::from_env`]) — no `serde`, matching the rest of the workspace's
//! dependency stack, which never pulls it in.
use std::path::PathBuf;

/// Default startup recovery strategy: rescan data files rather than parse
/// hint files.
pub const DEFAULT_HINT_MODE: bool = false;
/// Default per-file bloom bit count.
pub const DEFAULT_BLOOM_BITS: u64 = bloom::DEFAULT_BLOOM_BITS;
/// Default per-file bloom hash count.
pub const DEFAULT_BLOOM_HASHES: u32 = bloom::DEFAULT_BLOOM_HASHES;
/// Default key-index shard count.
pub const DEFAULT_INDEX_SHARDS: usize = 16;

/// Runtime configuration for a [`Cask`](https://docs.rs/cask) instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database root directory.
    pub directory: PathBuf,
    /// If `true`, startup recovery parses `.hnt` hint files instead of
    /// rescanning `.data` files.
    pub hint_mode: bool,
    /// Per-file bloom filter bit count.
    pub bloom_bits: u64,
    /// Per-file bloom filter hash count.
    pub bloom_hashes: u32,
    /// Number of shards in the in-memory key index.
    pub index_shards: usize,
}

impl Config {
    /// Builds a config for `directory` with default tuning.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            hint_mode: DEFAULT_HINT_MODE,
            bloom_bits: DEFAULT_BLOOM_BITS,
            bloom_hashes: DEFAULT_BLOOM_HASHES,
            index_shards: DEFAULT_INDEX_SHARDS,
        }
    }

    /// Builds a config for `directory`, overriding defaults from environment
    /// variables where set:
    ///
    /// | Field          | Env var             |
    /// |-----------------|---------------------|
    /// | `hint_mode`     | `CASK_HINT_MODE`    |
    /// | `bloom_bits`    | `CASK_BLOOM_BITS`   |
    /// | `bloom_hashes`  | `CASK_BLOOM_HASHES` |
    /// | `index_shards`  | `CASK_INDEX_SHARDS` |
    ///
    /// Unparseable values fall back to the default rather than erroring, the
    /// same permissive behavior the `cli` crate's own `env_or` helper uses.
    #[must_use]
    pub fn from_env<P: Into<PathBuf>>(directory: P) -> Self {
        Self::new(directory)
            .with_hint_mode(env_parsed("CASK_HINT_MODE", DEFAULT_HINT_MODE))
            .with_bloom_bits(env_parsed("CASK_BLOOM_BITS", DEFAULT_BLOOM_BITS))
            .with_bloom_hashes(env_parsed("CASK_BLOOM_HASHES", DEFAULT_BLOOM_HASHES))
            .with_index_shards(env_parsed("CASK_INDEX_SHARDS", DEFAULT_INDEX_SHARDS))
    }

    /// Builds a config from the `CASK_DIR` environment variable, which must
    /// be set.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if `CASK_DIR` is unset.
    pub fn from_env_dir() -> Result<Self, String> {
        let dir = std::env::var("CASK_DIR").map_err(|_| "CASK_DIR is not set".to_string())?;
        Ok(Self::from_env(dir))
    }

    /// Sets the startup recovery strategy.
    #[must_use]
    pub fn with_hint_mode(mut self, hint_mode: bool) -> Self {
        self.hint_mode = hint_mode;
        self
    }

    /// Sets the per-file bloom bit count.
    #[must_use]
    pub fn with_bloom_bits(mut self, bloom_bits: u64) -> Self {
        self.bloom_bits = bloom_bits;
        self
    }

    /// Sets the per-file bloom hash count.
    #[must_use]
    pub fn with_bloom_hashes(mut self, bloom_hashes: u32) -> Self {
        self.bloom_hashes = bloom_hashes;
        self
    }

    /// Sets the key-index shard count.
    #[must_use]
    pub fn with_index_shards(mut self, index_shards: usize) -> Self {
        self.index_shards = index_shards;
        self
    }
}

/// Reads `key` from the environment and parses it, falling back to
/// `default` if unset or unparseable.
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
