//! Watch loop
//!
//! Wires the pieces together on a single-threaded runtime:
//!
//! ```text
//! WatchSession::next() → Builder::build() → Supervisor → Notifier
//!         ▲                     ▲
//!         └── shutdown ─────────┘   (either wait is abandoned on Ctrl+C)
//! ```
//!
//! Batches are handled strictly one at a time, in order. Nothing here runs
//! concurrently with the supervisor, so worker replacement needs no locking.


use std::path::Path;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::builder::{BuildOutcome, Builder};
use crate::config::NotifyConfig;
use crate::core::is_shutdown;
use crate::logger::{status_detach, status_error, status_success};
use crate::notifier::Notifier;
use crate::supervisor::{Launcher, ProcessSpawnError, Supervisor, SupervisorState, Transition};
use crate::watch::{ChangeBatch, WatchSession};
use crate::{debug, log};

/// Message shown after every successful build.
pub const BUILD_COMPLETE: &str = "Build complete";

/// Counters for one watch session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub batches: usize,
    pub failed_builds: usize,
    pub spawn_errors: usize,
}

pub struct Coordinator<B, L: Launcher, N> {
    builder: B,
    supervisor: Supervisor<L>,
    notifier: N,
    notify: NotifyConfig,
    initial_build: bool,
    stats: LoopStats,
}

impl<B: Builder, L: Launcher, N: Notifier> Coordinator<B, L, N> {
    pub fn new(builder: B, supervisor: Supervisor<L>, notifier: N, notify: NotifyConfig) -> Self {
        Self {
            builder,
            supervisor,
            notifier,
            notify,
            initial_build: false,
            stats: LoopStats::default(),
        }
    }

    /// Build once before waiting for the first change.
    pub fn with_initial_build(mut self, enabled: bool) -> Self {
        self.initial_build = enabled;
        self
    }

    pub fn supervisor(&self) -> &Supervisor<L> {
        &self.supervisor
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Run until `shutdown` fires or the session ends.
    ///
    /// Always leaves the supervisor idle and the session closed.
    pub async fn run(
        &mut self,
        session: &mut WatchSession,
        shutdown: &mut UnboundedReceiver<()>,
    ) -> LoopStats {
        let root = session.root().to_path_buf();
        debug!("watch"; "loop started on {}", root.display());

        'run: {
            if self.initial_build {
                let Some(outcome) = self.build_or_shutdown(shutdown).await else {
                    break 'run;
                };
                self.handle_outcome(outcome);
            }

            loop {
                let batch = tokio::select! {
                    biased;
                    _ = shutdown.recv() => break 'run,
                    batch = session.next() => match batch {
                        Some(batch) => batch,
                        None => break 'run,
                    },
                };
                self.log_batch(&batch, &root);

                let Some(outcome) = self.build_or_shutdown(shutdown).await else {
                    break 'run;
                };
                self.handle_outcome(outcome);
            }
        }

        self.stop(session);
        self.stats
    }

    /// Run the builder, giving up as soon as shutdown is requested.
    async fn build_or_shutdown(
        &mut self,
        shutdown: &mut UnboundedReceiver<()>,
    ) -> Option<BuildOutcome> {
        tokio::select! {
            biased;
            _ = shutdown.recv() => None,
            outcome = self.builder.build() => Some(outcome),
        }
    }

    /// Apply one build outcome: worker transition, console status, notification.
    ///
    /// Outcomes arriving after a shutdown request are dropped.
    pub fn handle_outcome(&mut self, outcome: BuildOutcome) {
        if is_shutdown() {
            debug!("watch"; "shutdown pending, dropping build outcome");
            return;
        }

        let success = outcome.is_success();
        if !success {
            self.stats.failed_builds += 1;
            status_error("build failed", outcome.error().unwrap_or_default());
        }

        match self.supervisor.on_build_outcome(outcome) {
            Ok(transition) => report_transition(transition),
            Err(e) => {
                self.stats.spawn_errors += 1;
                self.report_spawn_error(&e);
            }
        }

        if success {
            self.notifier
                .notify(&self.notify.title, BUILD_COMPLETE, self.notify.timeout());
        }
    }

    fn log_batch(&mut self, batch: &ChangeBatch, root: &Path) {
        self.stats.batches += 1;
        // Worker output may sit below the last status block
        status_detach();
        log!("watch"; "{}", batch.summary(root));
        debug!("watch"; "{} path(s) in batch", batch.len());
        for (path, kind) in batch.iter() {
            debug!("watch"; "{} {}", kind.label(), path.display());
        }
    }

    fn report_spawn_error(&self, error: &ProcessSpawnError) {
        let mut detail = match std::error::Error::source(error) {
            Some(source) => source.to_string(),
            None => String::new(),
        };
        if self.supervisor.state() == SupervisorState::Running {
            detail.push_str("\nprevious worker keeps running");
        }
        status_error(&error.to_string(), detail.trim_start());
    }

    fn stop(&mut self, session: &mut WatchSession) {
        status_detach();
        if let Some(pid) = self.supervisor.shutdown() {
            log!("worker"; "stopped pid {}", pid);
        }
        session.close();
        debug!("watch"; "{} batches, {} failed builds, {} spawn errors, {} signals sent",
            self.stats.batches, self.stats.failed_builds, self.stats.spawn_errors,
            self.supervisor.signals_sent());
    }
}

fn report_transition(transition: Transition) {
    match transition {
        Transition::Skipped => {}
        Transition::Started { pid } => {
            status_success(&format!("{BUILD_COMPLETE}, worker started (pid {pid})"));
        }
        Transition::Replaced { old, new } => {
            status_success(&format!("{BUILD_COMPLETE}, worker restarted (pid {old} -> {new})"));
        }
    }
}
