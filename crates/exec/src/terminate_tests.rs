// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::ProcessRecord;
use std::process::Stdio;
use std::time::Duration;

async fn spawn_sleeper() -> tokio::process::Child {
    tokio::process::Command::new("sleep")
        .arg("30")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

#[tokio::test]
async fn retire_absent_key_is_a_noop() {
    let registry = ProcessRegistry::new();
    let service = TerminationService::new(registry.clone());

    assert!(service.retire(std::path::Path::new("/ws/absent")));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn retire_terminates_live_process_and_clears_entry() {
    let registry = ProcessRegistry::new();
    let service = TerminationService::new(registry.clone());
    let key = std::path::Path::new("/ws/live");

    let mut child = spawn_sleeper().await;
    let pid = child.id().unwrap();
    registry.register(key, ProcessRecord { pid, command: "sleep 30".into() });

    assert!(service.retire(key));
    assert!(!registry.contains(key));

    // The child should die from SIGTERM well before its natural end.
    let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
        .await
        .expect("child did not die after SIGTERM")
        .unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn retire_of_already_exited_process_still_clears_entry() {
    let registry = ProcessRegistry::new();
    let service = TerminationService::new(registry.clone());
    let key = std::path::Path::new("/ws/gone");

    // Spawn and fully reap a child so its pid refers to no live process.
    let mut child = tokio::process::Command::new("true")
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    let pid = child.id().unwrap();
    child.wait().await.unwrap();

    registry.register(key, ProcessRecord { pid, command: "true".into() });

    // ESRCH is benign: no error, entry removed.
    assert!(service.retire(key));
    assert!(!registry.contains(key));
}

#[tokio::test]
async fn bulk_cleanup_retires_everything() {
    let registry = ProcessRegistry::new();
    let service = TerminationService::new(registry.clone());

    let mut a = spawn_sleeper().await;
    let mut b = spawn_sleeper().await;
    registry.register(
        std::path::Path::new("/ws/a"),
        ProcessRecord { pid: a.id().unwrap(), command: "sleep 30".into() },
    );
    registry.register(
        std::path::Path::new("/ws/b"),
        ProcessRecord { pid: b.id().unwrap(), command: "sleep 30".into() },
    );

    let remaining = service.bulk_cleanup();
    assert_eq!(remaining, 0);
    assert!(registry.is_empty());

    let _ = tokio::time::timeout(Duration::from_secs(5), a.wait()).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), b.wait()).await;
}
