//! `build` section configuration.
//!
//! # Example
//!
//! ```json
//! "build": {
//!   "command": ["./node_modules/.bin/broccoli", "build", "build"],
//!   "artifact": "bundle.js"
//! }
//! ```
//!
//! An empty `command` means the build runs elsewhere (e.g. a long running
//! broccoli watcher) and fern only reacts to its output.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Build step settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Program and arguments, run from the project root.
    pub command: Vec<String>,

    /// File inside `output_path` handed to the worker (defaults to the directory).
    pub artifact: Option<PathBuf>,
}

impl BuildConfig {
    /// Whether fern runs the build itself.
    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }
}
