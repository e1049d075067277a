//! In-memory launcher for supervisor and coordinator tests.

use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::rc::Rc;

use super::{Launcher, TermSignal, WorkerCommand, WorkerProcess};

/// Everything the fake processes saw.
#[derive(Debug, Default)]
pub(crate) struct Log {
    pub(crate) next_pid: u32,
    pub(crate) spawned: Vec<(u32, Vec<String>)>,
    pub(crate) signals: Vec<(u32, TermSignal)>,
    /// Pids that exit as soon as they are signalled
    pub(crate) exited: Vec<u32>,
    pub(crate) ignore_signals: bool,
    pub(crate) fail_resolve: bool,
    pub(crate) fail_launch: bool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeLauncher(Rc<RefCell<Log>>);

impl FakeLauncher {
    pub(crate) fn log(&self) -> std::cell::Ref<'_, Log> {
        self.0.borrow()
    }

    pub(crate) fn set(&self, f: impl FnOnce(&mut Log)) {
        f(&mut self.0.borrow_mut());
    }
}

pub(crate) struct FakeProcess {
    pub(crate) pid: u32,
    log: Rc<RefCell<Log>>,
}

impl Launcher for FakeLauncher {
    type Process = FakeProcess;

    fn resolve(&self, command: &WorkerCommand) -> io::Result<()> {
        if self.0.borrow().fail_resolve {
            return Err(io::Error::new(io::ErrorKind::NotFound, command.program.clone()));
        }
        Ok(())
    }

    fn launch(&mut self, command: &WorkerCommand, output: &Path) -> io::Result<FakeProcess> {
        let mut log = self.0.borrow_mut();
        if log.fail_launch {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        log.next_pid += 1;
        let pid = 100 + log.next_pid;
        let args = command
            .args_for(output)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        log.spawned.push((pid, args));
        Ok(FakeProcess {
            pid,
            log: Rc::clone(&self.0),
        })
    }
}

impl WorkerProcess for FakeProcess {
    fn id(&self) -> u32 {
        self.pid
    }

    fn signal(&mut self, signal: TermSignal) -> io::Result<()> {
        let mut log = self.log.borrow_mut();
        log.signals.push((self.pid, signal));
        if !log.ignore_signals || signal == TermSignal::Kill {
            log.exited.push(self.pid);
        }
        Ok(())
    }

    fn try_wait(&mut self) -> io::Result<bool> {
        Ok(self.log.borrow().exited.contains(&self.pid))
    }
}
