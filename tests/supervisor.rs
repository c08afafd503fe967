//! End-to-end tests for the supervisor loop.

#![cfg(unix)]

use std::fs;
use std::time::Duration;

use ck_supervisor::config::ConfigError;
use ck_supervisor::launcher::{log_file_path, payload_file_path};
use ck_supervisor::supervisor::{SupervisorError, SupervisorState};

mod common;

use common::{one_client, wait_until, Harness};

#[tokio::test]
async fn test_single_instance_end_to_end() {
    let harness = Harness::new();
    harness.write_config(&one_client("home", "a.example.com", 1080));

    let running = harness.spawn(100, 100);
    running.wait_for_generation(1).await;

    let payload = payload_file_path(harness.root(), "home");
    assert_eq!(fs::read_to_string(&payload).unwrap(), "payload");

    let expected_args = format!("-c {} -s a.example.com -p 443 -l 1080", payload.display());
    wait_until(Duration::from_secs(5), || {
        harness
            .events()
            .iter()
            .any(|e| e.starts_with("start ") && e.ends_with(&expected_args))
    })
    .await;

    let log = log_file_path(harness.root(), "home");
    wait_until(Duration::from_secs(5), || {
        let content = fs::read_to_string(&log).unwrap_or_default();
        content.contains("client output for a.example.com")
            && content.contains("client error for a.example.com")
    })
    .await;

    let pid = running.status.generation().unwrap().pid_of("home").unwrap();
    let status = running.status.clone();
    running.stop().await.unwrap();

    assert_eq!(status.state(), SupervisorState::Stopped);
    assert!(status.generation().is_none());
    if cfg!(target_os = "linux") {
        assert!(!common::process_alive(pid));
    }
}

#[tokio::test]
async fn test_adding_instance_restarts_all() {
    let harness = Harness::new();
    harness.write_config(&one_client("home", "a.example.com", 1080));

    let running = harness.spawn(150, 150);
    running.wait_for_generation(1).await;
    let first = running.status.generation().unwrap();
    let old_pid = first.pid_of("home").unwrap();

    harness.write_config(
        "clients:\n  home:\n    server: a.example.com\n    port: 443\n    listen: 1080\n    config: payload\n  work:\n    server: b.example.com\n    port: 8443\n    listen: 1081\n    config: other\n",
    );
    running.wait_for_generation(2).await;

    let second = running.status.generation().unwrap();
    assert_eq!(second.instances.len(), 2);
    let new_pid = second.pid_of("home").unwrap();
    assert_ne!(old_pid, new_pid, "home should be a new process");
    assert!(second.pid_of("work").is_some());

    assert_eq!(
        fs::read_to_string(payload_file_path(harness.root(), "work")).unwrap(),
        "other"
    );

    // No client of generation 2 saw the generation 1 process alive.
    wait_until(Duration::from_secs(5), || {
        harness.events().iter().filter(|e| e.starts_with("start ")).count() == 3
    })
    .await;
    let overlap = format!(" {old_pid}");
    assert!(
        !harness
            .events()
            .iter()
            .any(|e| e.starts_with("seen ") && e.ends_with(&overlap)),
        "old generation was still running when the new one started"
    );
    if cfg!(target_os = "linux") {
        assert!(!common::process_alive(old_pid));
    }

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_write_burst_triggers_single_reload() {
    let harness = Harness::new();
    harness.write_config(&one_client("home", "a.example.com", 1080));

    let running = harness.spawn(600, 100);
    running.wait_for_generation(1).await;

    for listen in 1081..1086 {
        harness.write_config(&one_client("home", "a.example.com", listen));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    running.wait_for_generation(2).await;
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(
        running.status.generation().map(|g| g.generation),
        Some(2),
        "burst of writes should reload exactly once"
    );

    let expected = "-l 1085";
    assert!(harness
        .events()
        .iter()
        .any(|e| e.starts_with("start ") && e.ends_with(expected)));

    running.stop().await.unwrap();
}

#[tokio::test]
async fn test_unparsable_reload_stops_supervisor() {
    let harness = Harness::new();
    harness.write_config(&one_client("home", "a.example.com", 1080));

    let running = harness.spawn(100, 100);
    running.wait_for_generation(1).await;
    let pid = running.status.generation().unwrap().pid_of("home").unwrap();

    harness.write_config("clients:\n  home: [broken\n");

    let result = tokio::time::timeout(Duration::from_secs(10), running.task)
        .await
        .expect("supervisor should stop on its own")
        .expect("supervisor task panicked");

    assert!(matches!(
        result,
        Err(SupervisorError::Config(ConfigError::Parse { .. }))
    ));
    assert_eq!(running.status.state(), SupervisorState::Stopped);
    if cfg!(target_os = "linux") {
        assert!(!common::process_alive(pid));
    }
}

#[tokio::test]
async fn test_missing_config_is_fatal_at_startup() {
    let harness = Harness::new();

    let running = harness.spawn(100, 100);
    let result = tokio::time::timeout(Duration::from_secs(5), running.task)
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(
        result,
        Err(SupervisorError::Config(ConfigError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_missing_binary_is_bootstrap_error() {
    let mut harness = Harness::new();
    harness.write_config(&one_client("home", "a.example.com", 1080));
    harness.binary = harness.bin_dir.path().join("not-installed");

    let running = harness.spawn(100, 100);
    let result = tokio::time::timeout(Duration::from_secs(5), running.task)
        .await
        .unwrap()
        .unwrap();

    assert!(matches!(result, Err(SupervisorError::Bootstrap(_))));
    assert!(harness.events().is_empty());
}

#[tokio::test]
async fn test_creates_missing_config_root() {
    let harness = Harness::new();
    let nested = harness.root().join("nested").join("cloak");

    let mut settings = harness.settings(100, 100);
    settings.config_root = nested.clone();

    let supervisor = ck_supervisor::Supervisor::new(
        settings,
        ck_supervisor::bootstrap::FixedBinary::new(&harness.binary),
    );
    let shutdown = ck_supervisor::Shutdown::new();
    let result = supervisor.run(shutdown.subscribe()).await;

    // The directory is created before the (absent) config is read.
    assert!(nested.is_dir());
    assert!(matches!(
        result,
        Err(SupervisorError::Config(ConfigError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_shutdown_during_settle_skips_relaunch() {
    let harness = Harness::new();
    harness.write_config(&one_client("home", "a.example.com", 1080));

    let running = harness.spawn(1_500, 1_500);
    running.wait_for_generation(1).await;
    let pid = running.status.generation().unwrap().pid_of("home").unwrap();

    harness.write_config(&one_client("home", "a.example.com", 1081));
    let status = running.status.clone();
    wait_until(Duration::from_secs(5), || {
        status.state() == SupervisorState::Reloading
    })
    .await;

    let started = std::time::Instant::now();
    running.stop().await.unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(1_000),
        "stop took {elapsed:?}, expected well under settle + grace"
    );
    assert_eq!(status.state(), SupervisorState::Stopped);
    assert_eq!(
        harness
            .events()
            .iter()
            .filter(|e| e.starts_with("start "))
            .count(),
        1,
        "no second generation may start after shutdown"
    );
    assert!(!harness.events().iter().any(|e| e.ends_with("-l 1081")));
    if cfg!(target_os = "linux") {
        assert!(!common::process_alive(pid));
    }
}
