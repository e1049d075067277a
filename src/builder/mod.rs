//! Build step.
//!
//! The build itself is opaque to fern: either an external tool keeps writing
//! the output tree (`PassthroughBuilder`) or fern runs a configured command
//! per change batch (`CommandBuilder`). Both report a [`BuildOutcome`] and
//! never fail in any other way.

mod command;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::FernConfig;

pub use command::CommandBuilder;

// =============================================================================
// BuildOutcome
// =============================================================================

/// Result of one build cycle.
///
/// Not `Clone`: each outcome is handed to the supervisor exactly once.
#[derive(Debug)]
pub struct BuildOutcome {
    timestamp: SystemTime,
    success: bool,
    output_path: PathBuf,
    error: Option<String>,
}

impl BuildOutcome {
    pub fn success(output_path: impl Into<PathBuf>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            success: true,
            output_path: output_path.into(),
            error: None,
        }
    }

    pub fn failure(output_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            success: false,
            output_path: output_path.into(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Error description of a failed build.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_output_path(self) -> PathBuf {
        self.output_path
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Regenerates build output.
///
/// Re-invoking is always allowed; failures are reported through
/// [`BuildOutcome::failure`].
#[allow(async_fn_in_trait)]
pub trait Builder {
    async fn build(&mut self) -> BuildOutcome;
}

/// Builder for trees written by an external build tool.
///
/// A settled change batch in the output tree means that tool has finished,
/// so the build succeeds as soon as the artifact is present.
pub struct PassthroughBuilder {
    artifact: PathBuf,
}

impl PassthroughBuilder {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
        }
    }
}

impl Builder for PassthroughBuilder {
    async fn build(&mut self) -> BuildOutcome {
        check_artifact(&self.artifact)
    }
}

/// Success if `artifact` exists, failure otherwise.
fn check_artifact(artifact: &Path) -> BuildOutcome {
    if artifact.exists() {
        BuildOutcome::success(artifact)
    } else {
        BuildOutcome::failure(
            artifact,
            format!("build output `{}` is missing", artifact.display()),
        )
    }
}

/// The builder selected by the config file.
pub enum ConfiguredBuilder {
    Passthrough(PassthroughBuilder),
    Command(CommandBuilder),
}

impl ConfiguredBuilder {
    pub fn from_config(config: &FernConfig) -> Self {
        if config.build.has_command() {
            Self::Command(CommandBuilder::new(config))
        } else {
            Self::Passthrough(PassthroughBuilder::new(config.artifact_path()))
        }
    }
}

impl Builder for ConfiguredBuilder {
    async fn build(&mut self) -> BuildOutcome {
        match self {
            Self::Passthrough(builder) => builder.build().await,
            Self::Command(builder) => builder.build().await,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
