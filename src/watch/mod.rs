//! File watching.
//!
//! Observes one directory tree and yields debounced [`ChangeBatch`]es:
//!
//! ```text
//! notify callback → crossbeam → bridge thread → tokio mpsc → Debouncer → next()
//! ```
//!
//! The watcher is attached as soon as the session opens, so writes that land
//! before the first `next()` call are buffered, not lost.

mod debouncer;
mod types;


use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use regex::RegexSet;
use tokio::sync::mpsc;

use crate::config::{ConfigurationError, WatchConfig};
use crate::utils::path::normalize_path;
use crate::{debug, log};

use debouncer::Debouncer;

pub use types::{ChangeBatch, ChangeKind};

/// Capacity of the bridge channel between the notify thread and the loop
const EVENT_BUFFER: usize = 64;

/// Timing and filtering for a [`WatchSession`].
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub debounce: Duration,
    pub cooldown: Duration,
    pub ignore: RegexSet,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            cooldown: Duration::from_millis(800),
            ignore: RegexSet::empty(),
        }
    }
}

impl WatchOptions {
    pub fn from_config(config: &WatchConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            debounce: config.debounce(),
            cooldown: config.cooldown(),
            ignore: config.ignore_set()?,
        })
    }
}

/// A live recursive watch on one directory.
pub struct WatchSession {
    root: PathBuf,
    /// Dropped on close, which detaches the OS watch and ends the bridge thread
    watcher: Option<RecommendedWatcher>,
    events: mpsc::Receiver<notify::Event>,
    debouncer: Debouncer,
}

impl WatchSession {
    /// Start watching `root` recursively.
    ///
    /// Fails if the root is missing, not a directory, or unreadable. Any later
    /// trouble (events from deleted subdirectories, notify errors) is logged
    /// and does not end the session.
    pub fn open(root: &Path, options: WatchOptions) -> Result<Self, ConfigurationError> {
        check_root(root)?;
        let root = normalize_path(root);

        let (notify_tx, notify_rx) = crossbeam::channel::unbounded::<notify::Result<notify::Event>>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = notify_tx.send(res);
        })
        .map_err(|e| ConfigurationError::Watch(root.clone(), e))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| ConfigurationError::Watch(root.clone(), e))?;

        let (async_tx, events) = mpsc::channel::<notify::Event>(EVENT_BUFFER);

        // Ends when the watcher (and with it `notify_tx`) is dropped
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        debug!("watch"; "watching {}", root.display());

        Ok(Self {
            debouncer: Debouncer::new(root.clone(), options.debounce, options.cooldown, options.ignore),
            root,
            watcher: Some(watcher),
            events,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_alive(&self) -> bool {
        self.watcher.is_some()
    }

    /// Wait for the next settled batch of changes.
    ///
    /// Returns `None` once the session is closed. Cancel safe: pending
    /// changes stay in the debouncer if the future is dropped.
    pub async fn next(&mut self) -> Option<ChangeBatch> {
        while self.is_alive() {
            tokio::select! {
                biased;
                event = self.events.recv() => match event {
                    Some(event) => self.debouncer.add_event(&event),
                    None => {
                        log!("watch"; "event stream ended, closing watch on {}", self.root.display());
                        self.close();
                    }
                },
                _ = tokio::time::sleep(self.debouncer.sleep_duration()) => {
                    if let Some(batch) = self.debouncer.take_if_ready() {
                        return Some(batch);
                    }
                }
            }
        }
        None
    }

    /// Stop watching. Idempotent.
    pub fn close(&mut self) {
        if self.watcher.take().is_some() {
            self.events.close();
            debug!("watch"; "closed {}", self.root.display());
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// The root must be an existing, readable directory.
fn check_root(root: &Path) -> Result<(), ConfigurationError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigurationError::MissingRoot(root.to_path_buf()),
        _ => ConfigurationError::Unreadable(root.to_path_buf(), e),
    })?;

    if !metadata.is_dir() {
        return Err(ConfigurationError::NotADirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|e| ConfigurationError::Unreadable(root.to_path_buf(), e))?;
    Ok(())
}
