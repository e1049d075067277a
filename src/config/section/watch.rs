//! `watch` section configuration.
//!
//! # Example
//!
//! ```json
//! "watch": {
//!   "root": "modules",
//!   "debounce_ms": 300,
//!   "cooldown_ms": 800,
//!   "ignore": ["^node_modules/", "\\.map$"]
//! }
//! ```
//!
//! Without `root`, fern watches `output_path`: an external build tool writes
//! there and every settled batch of writes is a finished build.

use std::path::PathBuf;
use std::time::Duration;

use regex::RegexSet;
use serde::{Deserialize, Serialize};

/// File watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory to watch (defaults to `output_path`).
    pub root: Option<PathBuf>,

    /// Quiet period before a batch of changes is released.
    pub debounce_ms: u64,

    /// Minimum time between two released batches.
    pub cooldown_ms: u64,

    /// Regex patterns matched against root-relative paths; matches are ignored.
    pub ignore: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: None,
            debounce_ms: 300,
            cooldown_ms: 800,
            ignore: Vec::new(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Compile `ignore` into a single matcher.
    pub fn ignore_set(&self) -> Result<RegexSet, regex::Error> {
        RegexSet::new(&self.ignore)
    }
}
