//! Project configuration management for `configs/*.json`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # "build"
//! │   ├── notify     # "notify"
//! │   ├── settings   # "settings"
//! │   ├── watch      # "watch"
//! │   └── worker     # "worker"
//! ├── types/         # Utility types
//! │   └── error      # ConfigError, ConfigurationError
//! └── mod.rs         # FernConfig (this file)
//! ```
//!
//! The product configs are shared with the JavaScript build and contain many
//! keys fern does not read. Those are reported in verbose mode and otherwise
//! ignored.

pub mod section;
pub mod types;

pub use section::{BuildConfig, NotifyConfig, SettingsConfig, WatchConfig, WorkerConfig};
pub use types::{ConfigDiagnostics, ConfigError, ConfigurationError};

use crate::{cli::Cli, debug, utils::path::normalize_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing a `configs/*.json` file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FernConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - the working directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Extension metadata
    pub settings: SettingsConfig,

    /// Build output directory
    #[serde(alias = "OUTPUT_PATH")]
    pub output_path: PathBuf,

    /// File watcher settings
    pub watch: WatchConfig,

    /// Build step settings
    pub build: BuildConfig,

    /// Worker process settings
    pub worker: WorkerConfig,

    /// Desktop notification settings
    pub notify: NotifyConfig,
}

impl Default for FernConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            settings: SettingsConfig::default(),
            output_path: PathBuf::from("build"),
            watch: WatchConfig::default(),
            build: BuildConfig::default(),
            worker: WorkerConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl FernConfig {
    /// Load the config selected on the command line.
    ///
    /// Relative paths inside the file are resolved against the current
    /// working directory, which is also the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(&root.join(cli.config_path()), &root)
    }

    /// Load, normalize and validate a config file for the given project root.
    pub fn load_from(config_path: &Path, root: &Path) -> Result<Self> {
        let mut config = Self::from_path(config_path)?;
        config.config_path = normalize_path(config_path);
        config.finalize(root);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content).map_err(ConfigError::Json)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            debug!("config"; "ignoring {} unknown field(s) in {}: {}",
                ignored.len(), path.display(), ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse JSON content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let mut deserializer = serde_json::Deserializer::from_str(content);
        let config = serde_ignored::deserialize(&mut deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        deserializer.end()?;
        Ok((config, ignored))
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Build output directory (absolute after loading).
    pub fn output_dir(&self) -> &Path {
        &self.output_path
    }

    /// Directory observed by the watcher.
    pub fn watch_root(&self) -> &Path {
        self.watch.root.as_deref().unwrap_or(&self.output_path)
    }

    /// Path handed to every freshly started worker.
    pub fn artifact_path(&self) -> PathBuf {
        match &self.build.artifact {
            Some(artifact) => self.output_path.join(artifact),
            None => self.output_path.clone(),
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every configured path against `root`.
    fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.set_root(&root);

        self.output_path = normalize_path(&root.join(&self.output_path));
        if let Some(watch_root) = self.watch.root.take() {
            self.watch.root = Some(normalize_path(&root.join(watch_root)));
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if self.worker.command.first().is_none_or(|p| p.is_empty()) {
            diag.error_with_hint(
                "worker.command",
                "worker program is missing",
                "e.g. [\"node\", \"fern/run_selenium_tests.es\"]",
            );
        }

        if self.build.command.iter().any(String::is_empty) {
            diag.error("build.command", "arguments must not be empty strings");
        }

        if let Err(err) = self.watch.ignore_set() {
            diag.error("watch.ignore", format!("invalid pattern: {err}"));
        }

        if self.build.has_command() && self.watch_root().starts_with(self.output_dir()) {
            diag.error_with_hint(
                "watch.root",
                format!(
                    "`{}` is inside the build output, every build would trigger the next one",
                    self.watch_root().display()
                ),
                "point watch.root at the sources, e.g. \"modules\"",
            );
        }

        if self.build.has_command() && self.output_dir().starts_with(self.watch_root()) {
            diag.error_with_hint(
                "watch.root",
                format!(
                    "build output `{}` is inside the watched tree, every build would trigger the next one",
                    self.output_dir().display()
                ),
                "watch the sources only, or move output_path outside watch.root",
            );
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse a JSON config.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> FernConfig {
    let (parsed, ignored) = FernConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
