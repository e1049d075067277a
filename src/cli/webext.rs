//! `fern test-webext`: rebuild on change and keep one test runner alive.

use anyhow::{Context, Result, bail};

use crate::builder::ConfiguredBuilder;
use crate::config::{ConfigError, FernConfig};
use crate::coordinator::Coordinator;
use crate::core::register_shutdown;
use crate::notifier;
use crate::supervisor::{ProcessLauncher, Supervisor, WorkerCommand};
use crate::watch::{WatchOptions, WatchSession};
use crate::{debug, log};

/// Run the watch loop until Ctrl+C.
///
/// Fails before any worker is started if the watch root is unusable.
pub fn test_webext(config: &FernConfig) -> Result<()> {
    let options = WatchOptions::from_config(&config.watch)
        .map_err(|e| ConfigError::Validation(format!("watch.ignore: {e}")))?;
    let mut session = WatchSession::open(config.watch_root(), options)?;

    let command = WorkerCommand::from_slice(&config.worker.command)
        .ok_or_else(|| ConfigError::Validation("worker.command is empty".into()))?;
    let launcher = ProcessLauncher::new(config.get_root(), config.worker.quiet);
    let supervisor = Supervisor::new(launcher, command, config.worker.signal)
        .with_exit_timeout(config.worker.exit_timeout());

    let builder = ConfiguredBuilder::from_config(config);
    let notifier = notifier::from_config(&config.notify);
    let mut coordinator = Coordinator::new(builder, supervisor, notifier, config.notify.clone())
        .with_initial_build(config.build.has_command());

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::unbounded_channel();
    if !register_shutdown(shutdown_tx) {
        bail!("watch loop already running");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    log!("watch"; "watching {} (Ctrl+C to stop)", config.root_relative(session.root()).display());
    let stats = runtime.block_on(coordinator.run(&mut session, &mut shutdown_rx));
    debug!("watch"; "stopped after {} batches", stats.batches);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationError;
    use crate::core::is_registered;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, json: &str) -> FernConfig {
        let path = dir.path().join("fern.json");
        fs::write(&path, json).unwrap();
        FernConfig::load_from(&path, dir.path()).unwrap()
    }

    fn assert_missing_root(err: &anyhow::Error, expected: &std::path::Path) {
        match err.downcast_ref::<ConfigurationError>() {
            Some(ConfigurationError::MissingRoot(path)) => assert_eq!(path, expected),
            other => panic!("expected MissingRoot, got {other:?} ({err:#})"),
        }
    }

    #[test]
    fn test_missing_watch_root_fails_before_loop() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            r#"{"worker": {"command": ["true"]}, "watch": {"root": "missing"}}"#,
        );

        let err = test_webext(&config).unwrap_err();
        assert_missing_root(&err, config.watch_root());
        assert!(!is_registered());
    }

    #[test]
    fn test_missing_output_path_fails_before_loop() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, r#"{"output_path": "build", "worker": {"command": ["true"]}}"#);
        assert!(!config.watch_root().exists());

        let err = test_webext(&config).unwrap_err();
        assert_missing_root(&err, config.output_dir());
        assert!(!is_registered());
    }
}
