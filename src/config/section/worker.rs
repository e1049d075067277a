//! `worker` section configuration.
//!
//! # Example
//!
//! ```json
//! "worker": {
//!   "command": ["node", "fern/run_selenium_tests.es"],
//!   "signal": "SIGTERM",
//!   "exit_timeout_ms": 2000
//! }
//! ```
//!
//! The build output path is appended to `command` as its last argument.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::supervisor::TermSignal;

/// Worker process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Program and leading arguments.
    pub command: Vec<String>,

    /// Signal sent to a worker that is being replaced or shut down.
    pub signal: TermSignal,

    /// Wait this long for a replaced worker to exit, then kill it.
    /// Unset: send the signal and move on without waiting.
    pub exit_timeout_ms: Option<u64>,

    /// Discard worker stdout/stderr instead of inheriting them.
    pub quiet: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            command: vec!["node".into(), "fern/run_selenium_tests.es".into()],
            signal: TermSignal::Term,
            exit_timeout_ms: None,
            quiet: false,
        }
    }
}

impl WorkerConfig {
    pub fn exit_timeout(&self) -> Option<Duration> {
        self.exit_timeout_ms.map(Duration::from_millis)
    }
}
