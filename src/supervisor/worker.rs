use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::TermSignal;

/// Program and leading arguments of the worker.
///
/// The build output path is appended as the last argument at launch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl WorkerCommand {
    /// Create from a command array. Returns `None` for an empty slice.
    pub fn from_slice(cmd: &[String]) -> Option<Self> {
        let (program, args) = cmd.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Full argument list for a worker bound to `output`.
    pub fn args_for(&self, output: &Path) -> Vec<std::ffi::OsString> {
        self.args
            .iter()
            .map(Into::into)
            .chain(std::iter::once(output.as_os_str().to_owned()))
            .collect()
    }
}

/// Starts worker processes.
///
/// The supervisor is the only caller; nothing else in fern spawns workers.
pub trait Launcher {
    type Process: WorkerProcess;

    /// Check that `command` can be started, without starting it.
    fn resolve(&self, command: &WorkerCommand) -> io::Result<()>;

    /// Start `command` with `output` as its positional argument.
    fn launch(&mut self, command: &WorkerCommand, output: &Path) -> io::Result<Self::Process>;
}

/// A started worker process.
pub trait WorkerProcess {
    fn id(&self) -> u32;

    /// Deliver `signal` without waiting for the process to react.
    fn signal(&mut self, signal: TermSignal) -> io::Result<()>;

    /// Reap the process if it has exited. `Ok(true)` once it is gone.
    fn try_wait(&mut self) -> io::Result<bool>;
}

/// The supervisor's record of one worker process.
#[derive(Debug)]
pub struct WorkerHandle<P> {
    process: P,
    pid: u32,
    started_at: Instant,
    output_path: PathBuf,
    /// Termination signal used, `None` while the worker is live.
    signal: Option<TermSignal>,
}

impl<P: WorkerProcess> WorkerHandle<P> {
    pub fn new(process: P, output_path: PathBuf) -> Self {
        Self {
            pid: process.id(),
            process,
            started_at: Instant::now(),
            output_path,
            signal: None,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Signal the worker was stopped with, if any.
    #[cfg(test)]
    pub(super) fn termination_signal(&self) -> Option<TermSignal> {
        self.signal
    }

    pub(super) fn is_killed(&self) -> bool {
        self.signal == Some(TermSignal::Kill)
    }

    /// Send `signal` once. Returns `Ok(false)` if the worker was already signalled.
    pub(super) fn terminate(&mut self, signal: TermSignal) -> io::Result<bool> {
        if self.signal.is_some() {
            return Ok(false);
        }
        // Recorded even on error: the handle is retired either way
        self.signal = Some(signal);
        self.process.signal(signal)?;
        Ok(true)
    }

    /// Escalate a signalled worker that did not exit in time.
    pub(super) fn force_kill(&mut self) -> io::Result<()> {
        self.signal = Some(TermSignal::Kill);
        self.process.signal(TermSignal::Kill)
    }

    pub(super) fn try_wait(&mut self) -> io::Result<bool> {
        self.process.try_wait()
    }

    #[cfg(test)]
    pub(super) fn process(&self) -> &P {
        &self.process
    }
}
