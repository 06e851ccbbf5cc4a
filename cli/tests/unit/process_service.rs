//! launch / stop / restart and PID marker bookkeeping.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use hive_cli::application::services::Caller;
use hive_cli::domain::error::LifecycleError;

use crate::helpers::{ECHO_SOURCE, FakeProcess, Harness, RecordingBus, publish_echo_v1, publish_tool};

fn lifecycle_error(err: &anyhow::Error) -> &LifecycleError {
    err.downcast_ref::<LifecycleError>()
        .unwrap_or_else(|| panic!("expected a LifecycleError, got: {err:#}"))
}

async fn installed_echo(h: &Harness) {
    publish_echo_v1(h);
    h.engine()
        .install(&Caller::local(), "echo", Some(ECHO_SOURCE))
        .await
        .unwrap();
}

#[tokio::test]
async fn stop_signals_recorded_pid_and_removes_marker() {
    let h = Harness::new();
    installed_echo(&h).await;
    let engine = h.engine();
    assert!(engine.is_running("echo"));

    let pid = engine.stop(&Caller::local(), "echo").await.unwrap();
    assert_eq!(pid, 4000);
    assert!(!h.process.is_alive_now(4000));
    assert!(!engine.is_running("echo"));
}

#[tokio::test]
async fn stop_without_marker_is_not_running() {
    let h = Harness::new();
    installed_echo(&h).await;
    let engine = h.engine();
    engine.stop(&Caller::local(), "echo").await.unwrap();
    let err = engine.stop(&Caller::local(), "echo").await.unwrap_err();
    assert!(matches!(lifecycle_error(&err), LifecycleError::NotRunning(_)));
}

#[tokio::test]
async fn undelivered_signal_keeps_marker() {
    let h = Harness::with(
        FakeProcess {
            refuse_signals: true,
            ..Default::default()
        },
        RecordingBus::default(),
    );
    installed_echo(&h).await;
    let err = h
        .engine()
        .stop(&Caller::local(), "echo")
        .await
        .unwrap_err();
    assert!(matches!(lifecycle_error(&err), LifecycleError::StopFailed { .. }));
    assert!(h.paths.pid_marker("echo").exists());
}

#[tokio::test]
async fn marker_without_pid_cannot_be_stopped() {
    let h = Harness::new();
    installed_echo(&h).await;
    std::fs::write(h.paths.pid_marker("echo"), "garbage").unwrap();
    let err = h
        .engine()
        .stop(&Caller::local(), "echo")
        .await
        .unwrap_err();
    assert!(matches!(lifecycle_error(&err), LifecycleError::StopFailed { .. }));
}

#[tokio::test]
async fn launch_while_running_is_refused() {
    let h = Harness::new();
    installed_echo(&h).await;
    let err = h
        .engine()
        .launch(&Caller::local(), "echo")
        .await
        .unwrap_err();
    assert!(matches!(lifecycle_error(&err), LifecycleError::AlreadyRunning(_)));
    assert_eq!(h.process.spawn_count(), 1);
}

#[tokio::test]
async fn launch_clears_stale_marker_of_dead_process() {
    let h = Harness::new();
    installed_echo(&h).await;
    h.process.crash(4000);

    let outcome = h
        .engine()
        .launch(&Caller::local(), "echo")
        .await
        .unwrap();
    assert_eq!(outcome.pid, 4001);
    assert_eq!(h.read(&h.paths.pid_marker("echo")), "4001");
    assert!(h.reporter.warnings().iter().any(|w| w.contains("stale")));
}

#[tokio::test]
async fn launch_runs_script_from_agent_dir() {
    let h = Harness::new();
    installed_echo(&h).await;
    let spawned = h.process.spawned.lock().unwrap().clone();
    let (program, cwd) = &spawned[0];
    assert_eq!(*program, h.paths.agent_dir("echo").join("run.sh"));
    assert_eq!(*cwd, h.paths.agent_dir("echo"));
}

#[tokio::test]
async fn launch_without_install_dir_fails() {
    let h = Harness::new();
    let engine = h.engine();
    engine.add(&Caller::local(), "echo", ECHO_SOURCE).await.unwrap();
    let err = engine.launch(&Caller::local(), "echo").await.unwrap_err();
    assert!(matches!(lifecycle_error(&err), LifecycleError::AgentDirMissing(_)));
    assert!(!h.paths.pid_marker("echo").exists());
}

#[tokio::test]
async fn launch_without_run_script_fails() {
    let h = Harness::new();
    publish_tool(&h, "https://example.org/tool.git", "0.3.0");
    let engine = h.engine();
    engine
        .install(&Caller::local(), "tool", Some("https://example.org/tool.git"))
        .await
        .unwrap();
    std::fs::create_dir_all(h.paths.agent_dir("tool")).unwrap();
    let err = engine.launch(&Caller::local(), "tool").await.unwrap_err();
    assert!(matches!(lifecycle_error(&err), LifecycleError::NoRunScript(_)));
}

#[tokio::test]
async fn unreachable_bus_does_not_fail_launch() {
    let h = Harness::with(
        FakeProcess::default(),
        RecordingBus {
            unreachable: true,
            ..Default::default()
        },
    );
    publish_echo_v1(&h);
    let outcome = h
        .engine()
        .install(&Caller::local(), "echo", Some(ECHO_SOURCE))
        .await
        .unwrap();
    let launched = outcome.launched.expect("launched");
    assert!(!launched.registered);
    assert!(h.paths.pid_marker("echo").exists());
    assert!(h.reporter.warnings().iter().any(|w| w.contains("register")));
}

#[tokio::test]
async fn restart_replaces_process_and_reregisters() {
    let h = Harness::new();
    installed_echo(&h).await;
    let outcome = h
        .engine()
        .restart(&Caller::local(), "echo")
        .await
        .unwrap();
    assert_eq!(outcome.pid, 4001);
    assert!(!h.process.is_alive_now(4000));
    assert!(h.process.is_alive_now(4001));
    assert_eq!(h.bus.to("server").len(), 2);
}

#[tokio::test]
async fn restart_of_stopped_agent_is_not_running() {
    let h = Harness::new();
    installed_echo(&h).await;
    let engine = h.engine();
    engine.stop(&Caller::local(), "echo").await.unwrap();
    let err = engine.restart(&Caller::local(), "echo").await.unwrap_err();
    assert!(matches!(lifecycle_error(&err), LifecycleError::NotRunning(_)));
    assert_eq!(h.process.spawn_count(), 1);
}
