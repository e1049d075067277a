//! Desktop notifications.
//!
//! Strictly best effort: a missing backend or a failing one is never
//! allowed to interrupt the watch loop.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use thiserror::Error;

use crate::config::NotifyConfig;
use crate::debug;

/// A notification could not be shown.
#[derive(Debug, Error)]
pub enum NotificationFailure {
    #[error("no notification backend found")]
    NoBackend,

    #[error("failed to run `{backend}`")]
    Spawn {
        backend: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub trait Notifier {
    /// Show a notification without waiting for it to be dismissed.
    fn send(&self, title: &str, message: &str, timeout: Duration) -> Result<(), NotificationFailure>;

    /// Like [`send`](Self::send), but failures are only debug-logged.
    fn notify(&self, title: &str, message: &str, timeout: Duration) {
        if let Err(e) = self.send(title, message, timeout) {
            debug!("notify"; "{:#}", anyhow::Error::from(e));
        }
    }
}

/// Pick the notifier for `config`.
pub fn from_config(config: &NotifyConfig) -> Box<dyn Notifier> {
    if !config.enable {
        return Box::new(NoopNotifier);
    }
    let desktop = DesktopNotifier::detect();
    if desktop.is_available() {
        Box::new(desktop)
    } else {
        Box::new(NoopNotifier)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn send(&self, title: &str, message: &str, timeout: Duration) -> Result<(), NotificationFailure> {
        (**self).send(title, message, timeout)
    }
}

/// Notifications turned off.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, _: &str, _: &str, _: Duration) -> Result<(), NotificationFailure> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    NotifySend,
    TerminalNotifier,
    Osascript,
}

impl BackendKind {
    fn program(self) -> &'static str {
        match self {
            Self::NotifySend => "notify-send",
            Self::TerminalNotifier => "terminal-notifier",
            Self::Osascript => "osascript",
        }
    }

    /// Backends to try, most capable first.
    fn candidates() -> &'static [Self] {
        if cfg!(target_os = "macos") {
            &[Self::TerminalNotifier, Self::Osascript]
        } else {
            &[Self::NotifySend, Self::TerminalNotifier]
        }
    }
}

#[derive(Debug, Clone)]
struct Backend {
    kind: BackendKind,
    path: PathBuf,
}

impl Backend {
    fn command(&self, title: &str, message: &str, timeout: Duration) -> Command {
        let mut cmd = Command::new(&self.path);
        match self.kind {
            BackendKind::NotifySend => {
                cmd.arg("-a")
                    .arg("fern")
                    .arg("-t")
                    .arg(timeout.as_millis().to_string())
                    .arg(title)
                    .arg(message);
            }
            BackendKind::TerminalNotifier => {
                cmd.args(["-title", title, "-message", message]);
            }
            // Notification Center decides how long to show it
            BackendKind::Osascript => {
                cmd.arg("-e").arg(format!(
                    "display notification {} with title {}",
                    applescript_string(message),
                    applescript_string(title)
                ));
            }
        }
        cmd
    }
}

/// Shows notifications through a desktop helper program.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    backend: Option<Backend>,
}

impl DesktopNotifier {
    /// Look for a backend on `PATH`.
    pub fn detect() -> Self {
        let backend = BackendKind::candidates().iter().find_map(|&kind| {
            which::which(kind.program())
                .ok()
                .map(|path| Backend { kind, path })
        });

        match &backend {
            Some(b) => debug!("notify"; "using {}", b.path.display()),
            None => debug!("notify"; "no notification backend on PATH"),
        }
        Self { backend }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }
}

impl Notifier for DesktopNotifier {
    fn send(&self, title: &str, message: &str, timeout: Duration) -> Result<(), NotificationFailure> {
        let backend = self.backend.as_ref().ok_or(NotificationFailure::NoBackend)?;

        let mut child = backend
            .command(title, message, timeout)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| NotificationFailure::Spawn {
                backend: backend.kind.program(),
                source,
            })?;

        // Reap in the background, the loop never waits on a notification
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// Quote `s` as an AppleScript string literal.
fn applescript_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
