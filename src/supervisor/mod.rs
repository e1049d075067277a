//! Worker process supervision.
//!
//! Keeps at most one worker alive, bound to the latest successful build:
//!
//! ```text
//! Idle --(successful build)--> Running --(successful build)--> Running
//!                                 |        (old signalled, new spawned)
//!                                 +--------(shutdown)--------> Idle
//! ```
//!
//! Failed builds never touch the worker. Replaced workers are signalled and
//! not waited for, unless an exit timeout is configured. Without one, at most
//! `MAX_STUBBORN` replaced workers may ignore their signal before the oldest
//! is killed.

mod process;
mod signal;
mod worker;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod tests;

use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::builder::BuildOutcome;
use crate::{debug, log};

pub use process::ProcessLauncher;
pub use signal::TermSignal;
pub use worker::{Launcher, WorkerCommand, WorkerHandle, WorkerProcess};

/// Poll interval while waiting for a signalled worker to exit.
const EXIT_POLL: Duration = Duration::from_millis(25);

/// Signalled workers allowed to outlive their replacement before `SIGKILL`.
const MAX_STUBBORN: usize = 4;

/// The worker could not be started.
///
/// Reported to the caller; the supervisor keeps watching for the next build.
#[derive(Debug, Error)]
pub enum ProcessSpawnError {
    #[error("worker program `{program}` not found")]
    NotFound {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn worker `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No worker
    Idle,
    /// Exactly one live worker
    Running,
}

/// What a build outcome did to the worker slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Failed build, current worker (if any) left alone
    Skipped,
    /// Idle -> Running
    Started { pid: u32 },
    /// Running -> Running
    Replaced { old: u32, new: u32 },
}

/// Owner of the single worker slot.
pub struct Supervisor<L: Launcher> {
    launcher: L,
    command: WorkerCommand,
    signal: TermSignal,
    exit_timeout: Option<Duration>,
    current: Option<WorkerHandle<L::Process>>,
    /// Signalled workers not yet reaped
    retired: Vec<WorkerHandle<L::Process>>,
    signals_sent: usize,
}

impl<L: Launcher> Supervisor<L> {
    pub fn new(launcher: L, command: WorkerCommand, signal: TermSignal) -> Self {
        Self {
            launcher,
            command,
            signal,
            exit_timeout: None,
            current: None,
            retired: Vec::new(),
            signals_sent: 0,
        }
    }

    /// Wait up to `timeout` for a replaced worker to exit before starting the
    /// next one, killing it if it does not.
    pub fn with_exit_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.exit_timeout = timeout;
        self
    }

    pub fn state(&self) -> SupervisorState {
        match self.current {
            Some(_) => SupervisorState::Running,
            None => SupervisorState::Idle,
        }
    }

    /// The live worker, if any.
    pub fn current(&self) -> Option<&WorkerHandle<L::Process>> {
        self.current.as_ref()
    }

    /// Termination signals delivered so far (replacements and shutdown).
    pub fn signals_sent(&self) -> usize {
        self.signals_sent
    }

    /// Apply one build outcome to the worker slot.
    ///
    /// The program is resolved before the old worker is signalled, so a
    /// missing executable leaves the running worker untouched. If the spawn
    /// itself fails after that, the supervisor ends up idle.
    pub fn on_build_outcome(
        &mut self,
        outcome: BuildOutcome,
    ) -> Result<Transition, ProcessSpawnError> {
        if !outcome.is_success() {
            debug!("worker"; "build failed, keeping current worker");
            return Ok(Transition::Skipped);
        }

        self.launcher
            .resolve(&self.command)
            .map_err(|source| ProcessSpawnError::NotFound {
                program: self.command.program.clone(),
                source,
            })?;

        self.reap_retired();
        let old = self.retire_current();

        let output = outcome.into_output_path();
        let process = self
            .launcher
            .launch(&self.command, &output)
            .map_err(|source| ProcessSpawnError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;

        let handle = WorkerHandle::new(process, output);
        let new = handle.pid();
        debug!("worker"; "started pid {} for {}", new, handle.output_path().display());
        self.current = Some(handle);

        Ok(match old {
            Some(old) => Transition::Replaced { old, new },
            None => Transition::Started { pid: new },
        })
    }

    /// Signal the live worker and go idle.
    ///
    /// Safe to call any number of times; only the first call after a start
    /// sends a signal. Returns the pid that was signalled.
    pub fn shutdown(&mut self) -> Option<u32> {
        self.reap_retired();
        if self.current.is_none() {
            return None;
        }
        for handle in self.retired.iter().filter(|h| !h.is_killed()) {
            log!(
                "worker";
                "pid {} ignored {} and is still running",
                handle.pid(),
                self.signal
            );
        }

        let pid = self.retire_current()?;
        debug!("worker"; "stopped pid {} on shutdown", pid);
        Some(pid)
    }

    /// Move the live worker to `retired`, signalling it on the way.
    fn retire_current(&mut self) -> Option<u32> {
        let mut handle = self.current.take()?;
        let pid = handle.pid();

        match handle.terminate(self.signal) {
            Ok(true) => {
                self.signals_sent += 1;
                debug!("worker"; "sent {} to pid {} after {:?}", self.signal, pid, handle.uptime());
            }
            Ok(false) => {}
            Err(e) => log!("worker"; "failed to send {} to pid {}: {}", self.signal, pid, e),
        }

        if let Some(timeout) = self.exit_timeout {
            Self::await_exit(&mut handle, timeout);
        }

        self.retired.push(handle);
        self.kill_stubborn();
        Some(pid)
    }

    /// Kill the oldest retired workers once more than `MAX_STUBBORN` of
    /// them have outlived their stop signal.
    fn kill_stubborn(&mut self) {
        let stubborn = self.retired.iter().filter(|h| !h.is_killed()).count();
        let excess = stubborn.saturating_sub(MAX_STUBBORN);

        for handle in self.retired.iter_mut().filter(|h| !h.is_killed()).take(excess) {
            log!("worker"; "pid {} ignored {}, killing", handle.pid(), self.signal);
            if let Err(e) = handle.force_kill() {
                log!("worker"; "failed to kill pid {}: {}", handle.pid(), e);
            }
        }
    }

    /// Bounded wait for a signalled worker, escalating to `SIGKILL`.
    fn await_exit(handle: &mut WorkerHandle<L::Process>, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        loop {
            match handle.try_wait() {
                Ok(true) | Err(_) => return,
                Ok(false) if Instant::now() >= deadline => break,
                Ok(false) => std::thread::sleep(EXIT_POLL),
            }
        }

        log!("worker"; "pid {} still running after {:?}, killing", handle.pid(), timeout);
        if let Err(e) = handle.force_kill() {
            log!("worker"; "failed to kill pid {}: {}", handle.pid(), e);
        }
    }

    /// Drop retired workers that have exited.
    fn reap_retired(&mut self) {
        self.retired
            .retain_mut(|handle| matches!(handle.try_wait(), Ok(false)));
    }
}

impl<L: Launcher> Drop for Supervisor<L> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
