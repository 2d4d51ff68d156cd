// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::Classification;
use tempfile::TempDir;

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

fn supervisor(registry: &ProcessRegistry, window_ms: u64) -> DetachedSupervisor {
    DetachedSupervisor::new(registry.clone()).with_window(Duration::from_millis(window_ms))
}

/// Kill a leftover test child so unconfirmed-startup tests do not leak.
fn reap(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
}

#[tokio::test]
async fn early_exit_beats_the_window_and_registers_nothing() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    // Window far longer than the child's life: the exit must win the race.
    let sup = supervisor(&registry, 30_000);

    let outcome = sup.start(ws.path(), "sh", &sh("sleep 0.3; echo boom >&2; exit 1")).await;

    assert_eq!(outcome.classification, Classification::EarlyExit);
    assert_eq!(outcome.exit_code, Some(1));
    assert!(outcome.stdout_tail.contains("boom"));
    assert!(!registry.contains(ws.path()));
}

#[tokio::test]
async fn confirmed_startup_registers_and_reports_the_port() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    let sup = supervisor(&registry, 600);

    let outcome = sup
        .start(ws.path(), "sh", &sh("echo 'Server listening on port 4321'; sleep 30"))
        .await;

    assert_eq!(outcome.classification, Classification::StartupConfirmed);
    assert!(outcome.success());
    assert_eq!(outcome.port.as_deref(), Some("4321"));

    // Registry entry exists immediately after resolution, keyed by workspace.
    let record = registry.get(ws.path()).expect("record registered");
    assert_eq!(Some(record.pid), outcome.pid);

    TerminationService::new(registry).retire(ws.path());
}

#[tokio::test]
async fn phrase_without_port_still_confirms() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    let sup = supervisor(&registry, 600);

    let outcome = sup
        .start(ws.path(), "sh", &sh("echo 'Compiled successfully!'; sleep 30"))
        .await;

    assert_eq!(outcome.classification, Classification::StartupConfirmed);
    assert!(outcome.port.is_none());
    assert!(registry.contains(ws.path()));

    TerminationService::new(registry).retire(ws.path());
}

#[tokio::test]
async fn silent_child_is_unconfirmed_and_left_untracked() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    let sup = supervisor(&registry, 300);

    let outcome = sup.start(ws.path(), "sleep", &["30".to_string()]).await;

    assert_eq!(outcome.classification, Classification::StartupUnconfirmed);
    assert!(!outcome.success());
    // Alive but deliberately unregistered.
    assert!(!registry.contains(ws.path()));

    reap(outcome.pid.unwrap());
}

#[tokio::test]
async fn second_start_supersedes_the_first_occupant() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    let sup = supervisor(&registry, 600);
    let script = sh("echo 'listening on 127.0.0.1:8080'; sleep 30");

    let first = sup.start(ws.path(), "sh", &script).await;
    let second = sup.start(ws.path(), "sh", &script).await;

    assert_eq!(first.classification, Classification::StartupConfirmed);
    assert_eq!(second.classification, Classification::StartupConfirmed);

    // Never two entries for one key; the survivor is the second pid.
    assert_eq!(registry.len(), 1);
    assert_eq!(Some(registry.get(ws.path()).unwrap().pid), second.pid);
    assert_ne!(first.pid, second.pid);

    TerminationService::new(registry).retire(ws.path());
}

#[tokio::test]
async fn exit_after_confirmation_clears_the_entry_for_that_pid() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    let sup = supervisor(&registry, 300);

    let outcome = sup
        .start(ws.path(), "sh", &sh("echo 'server started on port 5555'; sleep 1"))
        .await;
    assert_eq!(outcome.classification, Classification::StartupConfirmed);
    assert!(registry.contains(ws.path()));

    // The child dies ~700ms after resolution; the watcher must clear the
    // entry since it still points at that pid.
    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.contains(ws.path()) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("stale entry was not cleared after the tracked process exited");
}

#[tokio::test]
async fn missing_executable_resolves_immediately_as_spawn_error() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    let sup = supervisor(&registry, 30_000);

    let start = std::time::Instant::now();
    let outcome = sup.start(ws.path(), "drover-no-such-binary", &[]).await;

    assert_eq!(outcome.classification, Classification::SpawnError);
    // No observation window is pending for a failed spawn.
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(!registry.contains(ws.path()));
}

#[tokio::test]
async fn noisy_child_is_classified_from_bounded_recent_output() {
    let ws = TempDir::new().unwrap();
    let registry = ProcessRegistry::new();
    let sup = supervisor(&registry, 800);

    // Floods well past the capture cap before announcing readiness; the
    // recency-preserving trim must keep the announcement visible.
    let outcome = sup
        .start(
            ws.path(),
            "sh",
            &sh("seq 1 100000; echo 'Server listening on port 7777'; sleep 30"),
        )
        .await;

    assert_eq!(outcome.classification, Classification::StartupConfirmed);
    assert_eq!(outcome.port.as_deref(), Some("7777"));

    TerminationService::new(registry).retire(ws.path());
}
