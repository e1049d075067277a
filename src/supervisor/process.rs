//! OS-backed worker processes.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use super::worker::{Launcher, WorkerCommand, WorkerProcess};
use super::TermSignal;

/// Launches workers as child processes of fern.
pub struct ProcessLauncher {
    cwd: PathBuf,
    quiet: bool,
}

impl ProcessLauncher {
    /// Workers run in `cwd`; `quiet` discards their stdout/stderr.
    pub fn new(cwd: impl Into<PathBuf>, quiet: bool) -> Self {
        Self {
            cwd: cwd.into(),
            quiet,
        }
    }

    /// Locate `program` on `PATH`, or relative to the working directory.
    fn locate(&self, program: &str) -> io::Result<PathBuf> {
        which::which_in(program, std::env::var_os("PATH"), &self.cwd)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))
    }
}

impl Launcher for ProcessLauncher {
    type Process = OsProcess;

    fn resolve(&self, command: &WorkerCommand) -> io::Result<()> {
        self.locate(&command.program).map(|_| ())
    }

    fn launch(&mut self, command: &WorkerCommand, output: &Path) -> io::Result<OsProcess> {
        let program = self.locate(&command.program)?;

        let mut cmd = Command::new(program);
        cmd.args(command.args_for(output))
            .current_dir(&self.cwd)
            .stdin(Stdio::null());

        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        Ok(OsProcess {
            child: cmd.spawn()?,
        })
    }
}

/// A worker running as a child process.
#[derive(Debug)]
pub struct OsProcess {
    child: Child,
}

impl WorkerProcess for OsProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    #[cfg(unix)]
    fn signal(&mut self, signal: TermSignal) -> io::Result<()> {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        #[allow(clippy::cast_possible_wrap)]
        let pid = Pid::from_raw(self.child.id() as i32);
        kill(pid, signal.to_nix()).map_err(io::Error::from)
    }

    #[cfg(not(unix))]
    fn signal(&mut self, _signal: TermSignal) -> io::Result<()> {
        self.child.kill()
    }

    fn try_wait(&mut self) -> io::Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }
}
