use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What listing does when one entry cannot be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Log the entry and keep iterating.
    #[default]
    Skip,
    /// Fail the listing on the first undecodable entry.
    Abort,
}

/// Configuration for opening a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the LMDB data and lock files.
    pub path: PathBuf,
    /// Maximum size of the memory map in bytes. Must be a multiple of the
    /// OS page size.
    pub map_size: usize,
    /// Maximum number of concurrently open read transactions.
    pub max_readers: u32,
    /// How long a writer waits for the writer slot before giving up.
    pub lock_timeout_ms: u64,
    /// Behavior of listings when an entry fails to decode.
    pub decode_policy: DecodePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("weekproject.db"),
            map_size: 64 * 1024 * 1024, // 64 MiB
            max_readers: 126,
            lock_timeout_ms: 1_000,
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    /// The writer-slot wait as a `Duration`.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
