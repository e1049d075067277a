use std::path::{Path, PathBuf};

use super::fake::FakeLauncher;
use super::*;

fn supervisor(launcher: &FakeLauncher) -> Supervisor<FakeLauncher> {
    let command = WorkerCommand::from_slice(&["node".into(), "run_tests.es".into()]).unwrap();
    Supervisor::new(launcher.clone(), command, TermSignal::Term)
}

fn ok() -> BuildOutcome {
    BuildOutcome::success("./out/bundle.js")
}

fn failed() -> BuildOutcome {
    BuildOutcome::failure("./out/bundle.js", "SyntaxError")
}

// =============================================================================
// Replacement protocol
// =============================================================================

#[test]
fn test_first_build_starts_worker() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);
    assert_eq!(sup.state(), SupervisorState::Idle);

    let transition = sup.on_build_outcome(ok()).unwrap();

    assert_eq!(transition, Transition::Started { pid: 101 });
    assert_eq!(sup.state(), SupervisorState::Running);
    assert_eq!(
        launcher.log().spawned,
        [(101, vec!["run_tests.es".to_string(), "./out/bundle.js".to_string()])]
    );
    assert!(launcher.log().signals.is_empty());

    let current = sup.current().unwrap();
    assert_eq!(current.output_path(), Path::new("./out/bundle.js"));
    assert_eq!(current.termination_signal(), None);
}

#[test]
fn test_second_build_replaces_worker() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);

    sup.on_build_outcome(ok()).unwrap();
    let transition = sup.on_build_outcome(ok()).unwrap();

    assert_eq!(transition, Transition::Replaced { old: 101, new: 102 });
    assert_eq!(launcher.log().signals, [(101, TermSignal::Term)]);
    assert_eq!(launcher.log().spawned[1].1[1], "./out/bundle.js");
    assert_eq!(sup.current().map(WorkerHandle::pid), Some(102));
}

#[test]
fn test_n_builds_leave_one_worker() {
    for n in 1..=6 {
        let launcher = FakeLauncher::default();
        let mut sup = supervisor(&launcher);

        for _ in 0..n {
            sup.on_build_outcome(ok()).unwrap();
        }

        assert_eq!(launcher.log().spawned.len(), n);
        assert_eq!(launcher.log().signals.len(), n - 1);
        assert_eq!(sup.signals_sent(), n - 1);
        assert_eq!(sup.state(), SupervisorState::Running);

        // Every spawned worker but the newest one has been signalled
        let live: Vec<u32> = launcher
            .log()
            .spawned
            .iter()
            .map(|(pid, _)| *pid)
            .filter(|pid| !launcher.log().signals.iter().any(|(s, _)| s == pid))
            .collect();
        assert_eq!(live, [sup.current().unwrap().pid()]);
    }
}

#[test]
fn test_failed_build_changes_nothing() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);

    assert_eq!(sup.on_build_outcome(failed()).unwrap(), Transition::Skipped);
    assert_eq!(sup.state(), SupervisorState::Idle);
    assert!(launcher.log().spawned.is_empty());

    sup.on_build_outcome(ok()).unwrap();
    assert_eq!(sup.on_build_outcome(failed()).unwrap(), Transition::Skipped);

    assert_eq!(launcher.log().spawned.len(), 1);
    assert!(launcher.log().signals.is_empty());
    assert_eq!(sup.current().map(WorkerHandle::pid), Some(101));
}

#[test]
fn test_interleaved_failures() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);

    for outcome in [ok(), failed(), failed(), ok(), failed(), ok()] {
        sup.on_build_outcome(outcome).unwrap();
    }

    assert_eq!(launcher.log().spawned.len(), 3);
    assert_eq!(launcher.log().signals.len(), 2);
}

// =============================================================================
// Spawn errors
// =============================================================================

#[test]
fn test_unresolvable_program_keeps_worker() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);
    sup.on_build_outcome(ok()).unwrap();

    launcher.set(|log| log.fail_resolve = true);
    let err = sup.on_build_outcome(ok()).unwrap_err();

    assert!(matches!(err, ProcessSpawnError::NotFound { ref program, .. } if program == "node"));
    assert!(launcher.log().signals.is_empty());
    assert_eq!(sup.state(), SupervisorState::Running);
    assert_eq!(sup.current().map(WorkerHandle::pid), Some(101));
}

#[test]
fn test_spawn_failure_recovers_on_next_build() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);
    sup.on_build_outcome(ok()).unwrap();

    launcher.set(|log| log.fail_launch = true);
    let err = sup.on_build_outcome(ok()).unwrap_err();
    assert!(matches!(err, ProcessSpawnError::Spawn { .. }));
    // Old worker was already signalled before the spawn attempt
    assert_eq!(sup.state(), SupervisorState::Idle);

    launcher.set(|log| log.fail_launch = false);
    assert_eq!(
        sup.on_build_outcome(ok()).unwrap(),
        Transition::Started { pid: 102 }
    );
    assert_eq!(launcher.log().signals.len(), 1);
}

// =============================================================================
// Shutdown
// =============================================================================

#[test]
fn test_shutdown_signals_once() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);
    sup.on_build_outcome(ok()).unwrap();

    assert_eq!(sup.shutdown(), Some(101));
    assert_eq!(sup.shutdown(), None);
    assert_eq!(sup.state(), SupervisorState::Idle);
    assert_eq!(launcher.log().signals, [(101, TermSignal::Term)]);

    drop(sup);
    assert_eq!(launcher.log().signals.len(), 1);
}

#[test]
fn test_shutdown_when_idle() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);
    assert_eq!(sup.shutdown(), None);
    assert!(launcher.log().signals.is_empty());
}

#[test]
fn test_drop_signals_live_worker() {
    let launcher = FakeLauncher::default();
    {
        let mut sup = supervisor(&launcher);
        sup.on_build_outcome(ok()).unwrap();
        sup.on_build_outcome(ok()).unwrap();
    }
    assert_eq!(
        launcher.log().signals,
        [(101, TermSignal::Term), (102, TermSignal::Term)]
    );
}

#[test]
fn test_configured_signal_used() {
    let launcher = FakeLauncher::default();
    let command = WorkerCommand::from_slice(&["./run.sh".into()]).unwrap();
    let mut sup = Supervisor::new(launcher.clone(), command, TermSignal::Int);

    sup.on_build_outcome(ok()).unwrap();
    sup.shutdown();

    assert_eq!(launcher.log().signals, [(101, TermSignal::Int)]);
    assert_eq!(launcher.log().spawned[0].1, ["./out/bundle.js"]);
}

// =============================================================================
// Retired workers
// =============================================================================

#[test]
fn test_retired_workers_reaped() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher);

    for _ in 0..4 {
        sup.on_build_outcome(ok()).unwrap();
    }

    // Each swap reaps workers that exited after an earlier signal
    assert!(sup.retired.len() <= 1);
    assert!(sup.retired.iter().all(|h| h.termination_signal() == Some(TermSignal::Term)));
}

#[test]
fn test_stubborn_workers_capped() {
    let launcher = FakeLauncher::default();
    launcher.set(|log| log.ignore_signals = true);
    let mut sup = supervisor(&launcher);

    // 101..=105 ignore SIGTERM, 106 is current
    for _ in 0..MAX_STUBBORN + 2 {
        sup.on_build_outcome(ok()).unwrap();
    }

    let kills: Vec<_> = launcher
        .log()
        .signals
        .iter()
        .filter(|(_, signal)| *signal == TermSignal::Kill)
        .map(|(pid, _)| *pid)
        .collect();
    assert_eq!(kills, [101]);
    assert_eq!(sup.retired.iter().filter(|h| !h.is_killed()).count(), MAX_STUBBORN);

    // The killed worker is reaped on the next swap and the next oldest goes
    sup.on_build_outcome(ok()).unwrap();
    assert!(sup.retired.iter().all(|h| h.process().pid != 101));
    assert!(launcher.log().signals.contains(&(102, TermSignal::Kill)));
    assert!(!launcher.log().signals.contains(&(103, TermSignal::Kill)));
}

#[test]
fn test_shutdown_leaves_stubborn_workers_alone() {
    let launcher = FakeLauncher::default();
    launcher.set(|log| log.ignore_signals = true);
    let mut sup = supervisor(&launcher);

    sup.on_build_outcome(ok()).unwrap();
    sup.on_build_outcome(ok()).unwrap();
    assert_eq!(sup.shutdown(), Some(102));

    // Reported, not escalated: only the cap kills
    assert_eq!(sup.retired.len(), 2);
    assert!(!launcher.log().signals.iter().any(|(_, s)| *s == TermSignal::Kill));
}

#[test]
fn test_exit_timeout_escalates_to_kill() {
    let launcher = FakeLauncher::default();
    launcher.set(|log| log.ignore_signals = true);
    let mut sup = supervisor(&launcher).with_exit_timeout(Some(std::time::Duration::from_millis(60)));

    sup.on_build_outcome(ok()).unwrap();
    sup.on_build_outcome(ok()).unwrap();

    assert_eq!(
        launcher.log().signals,
        [(101, TermSignal::Term), (101, TermSignal::Kill)]
    );
    assert_eq!(sup.current().map(WorkerHandle::pid), Some(102));
    assert_eq!(sup.retired[0].process().pid, 101);
}

#[test]
fn test_exit_timeout_not_needed() {
    let launcher = FakeLauncher::default();
    let mut sup = supervisor(&launcher).with_exit_timeout(Some(std::time::Duration::from_secs(5)));

    sup.on_build_outcome(ok()).unwrap();
    sup.on_build_outcome(ok()).unwrap();

    // Worker honoured SIGTERM immediately: no escalation
    assert_eq!(launcher.log().signals, [(101, TermSignal::Term)]);
}

#[test]
fn test_worker_command_args() {
    let command = WorkerCommand::from_slice(&["node".into(), "a.es".into()]).unwrap();
    let args = command.args_for(&PathBuf::from("build/bundle.js"));
    let args: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
    assert_eq!(args, ["a.es", "build/bundle.js"]);
    assert!(WorkerCommand::from_slice(&[]).is_none());
}
