// End-to-end engine behavior against an in-memory process table

use super::support::*;
use pidpatrol::core::monitor::{FakeProcess, ProcessStatus};
use pidpatrol::PatrolError;
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_alpha_beta_lifecycle() {
    let monitor = monitor_with(alpha_beta_probe());
    let (mut subscription, bootstrap) = monitor.subscribe();
    assert!(bootstrap.is_none());

    monitor.configure(["alpha", "beta"]).unwrap();
    monitor.start(None, None);

    let snapshot = next_snapshot(&mut subscription).await;
    assert_eq!(row_names(&snapshot), ["alpha", "beta"]);

    let alpha = snapshot.row("alpha").unwrap();
    assert_eq!(alpha.pids, vec![10, 11]);
    assert_eq!(alpha.status, ProcessStatus::Running);
    assert_eq!(alpha.cpu_percent_sum, 30.0);
    assert_eq!(alpha.cpu_percent, 7.5);
    assert_eq!(alpha.memory_mb, 16.0);

    let results = monitor.results().unwrap();
    assert_eq!(results.rows.len(), 2);

    monitor.remove("alpha").unwrap();
    let snapshot = snapshot_where(&mut subscription, |s| s.rows.len() == 1).await;
    assert_eq!(row_names(&snapshot), ["beta"]);
    assert_eq!(snapshot.processes.len(), 1);

    monitor.stop().unwrap();
    assert!(monitor.results().is_none());
    assert_eq!(monitor.watch_list(), vec!["beta"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_when_stopped_is_rejected() {
    let monitor = monitor_with(alpha_beta_probe());
    assert!(matches!(monitor.stop(), Err(PatrolError::NotRunning)));

    monitor.start(Some(vec!["beta".into()]), None);
    monitor.stop().unwrap();
    assert!(matches!(monitor.stop(), Err(PatrolError::NotRunning)));
    assert!(!monitor.is_running());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_overrides_in_place() {
    let monitor = monitor_with(alpha_beta_probe());
    let (mut subscription, _) = monitor.subscribe();

    monitor.start(Some(vec!["alpha".into()]), None);
    next_snapshot(&mut subscription).await;

    let config = monitor.start(Some(vec!["beta".into(), "gamma".into()]), Some(2.into()));
    assert!(config.running);
    assert_eq!(config.interval, 2.0);
    assert_eq!(config.names(), vec!["beta", "gamma"]);

    let snapshot = snapshot_where(&mut subscription, |s| s.rows.len() == 2).await;
    assert_eq!(row_names(&snapshot), ["beta", "gamma"]);
    monitor.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_interval_override_is_clamped() {
    let monitor = monitor_with(alpha_beta_probe());
    let config = monitor.start(Some(vec!["alpha".into()]), Some(0.1.into()));
    assert_eq!(config.interval, 1.0);
    monitor.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_only_duplicates_is_rejected() {
    let monitor = monitor_with(alpha_beta_probe());
    monitor.configure(["alpha"]).unwrap();

    let err = monitor.add(["ALPHA"]).unwrap_err();
    assert!(matches!(err, PatrolError::DuplicateEntry(_)));
    assert_eq!(err.status_code(), 409);

    assert_eq!(monitor.add(["alpha", "Beta"]).unwrap(), vec!["alpha", "Beta"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_interval_keeps_previous_value() {
    let monitor = monitor_with(alpha_beta_probe());
    monitor.set_interval(3).unwrap();

    for bad in [0.5, -1.0, f64::NAN] {
        assert!(monitor.set_interval(bad).is_err());
    }
    assert!(monitor.set_interval("x").is_err());
    assert_eq!(monitor.interval_secs(), 3.0);

    assert_eq!(monitor.set_interval("4").unwrap(), 4.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pids_are_unique_across_snapshot() {
    let probe = alpha_beta_probe();
    probe.spawn(FakeProcess::new(40, "Alpha"));
    let monitor = monitor_with(probe);
    let (mut subscription, _) = monitor.subscribe();

    monitor.start(Some(vec!["alpha".into(), "ALPHA".into(), "beta".into()]), None);
    let snapshot = next_snapshot(&mut subscription).await;
    monitor.stop().unwrap();

    assert_eq!(snapshot.rows.len(), 2);
    let all: Vec<u32> = snapshot.rows.iter().flat_map(|r| r.pids.clone()).collect();
    let unique: HashSet<u32> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len());
    assert_eq!(snapshot.row("alpha").unwrap().pids, vec![10, 11, 40]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_and_vanished_processes() {
    let probe = alpha_beta_probe();
    probe.spawn(FakeProcess::new(50, "ghost").inaccessible());
    let monitor = monitor_with(probe.clone());
    let (mut subscription, _) = monitor.subscribe();

    monitor.start(Some(vec!["ghost".into(), "nobody".into(), "beta".into()]), None);
    let snapshot = next_snapshot(&mut subscription).await;

    for name in ["ghost", "nobody"] {
        let row = snapshot.row(name).unwrap();
        assert_eq!(row.status, ProcessStatus::NotFound);
        assert!(row.pids.is_empty());
        assert_eq!(row.cpu_percent, 0.0);
        assert_eq!(row.memory_mb, 0.0);
    }

    probe.kill(20);
    let snapshot = snapshot_where(&mut subscription, |s| {
        s.row("beta").map(|r| !r.is_found()).unwrap_or(false)
    })
    .await;
    assert!(snapshot.row("beta").unwrap().pids.is_empty());
    monitor.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_commit_after_stop() {
    let probe = alpha_beta_probe();
    let monitor = monitor_with(probe.clone());
    let (mut subscription, _) = monitor.subscribe();

    monitor.start(Some(vec!["alpha".into()]), None);
    next_snapshot(&mut subscription).await;
    monitor.stop().unwrap();
    let calls = probe.measure_calls();

    // Drain what was published before stop returned
    while subscription.try_recv().is_ok() {}

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(subscription.try_recv().is_err());
    assert!(monitor.results().is_none());
    assert_eq!(probe.measure_calls(), calls);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_after_stop_starts_fresh() {
    let monitor = monitor_with(alpha_beta_probe());
    let (mut subscription, _) = monitor.subscribe();

    monitor.start(Some(vec!["beta".into()]), None);
    let first = next_snapshot(&mut subscription).await;
    monitor.stop().unwrap();

    monitor.start(None, None);
    let second = next_snapshot(&mut subscription).await;
    assert_eq!(row_names(&second), ["beta"]);
    assert!(second.tick > first.tick);
    monitor.stop().unwrap();
}

#[test]
fn test_sysinfo_probe_finds_this_process() {
    use pidpatrol::core::monitor::{ProcessProbe, Sampler, SysinfoProbe};
    use std::sync::Arc;

    let probe = Arc::new(SysinfoProbe::new());
    let own_pid = std::process::id();
    let Some(own) = probe.list().into_iter().find(|e| e.pid == own_pid) else {
        // Restricted sandboxes may hide the process table
        return;
    };

    let sampler = Sampler::with_settle(probe, Duration::from_millis(250));
    let sample = sampler.sample(&own.name.to_uppercase());
    assert!(sample.pids.contains(&own_pid));
    assert!(sample.memory_mb > 0.0);
    assert!((0.0..=100.0).contains(&sample.cpu_percent));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_huge_interval_never_stalls_the_loop() {
    use pidpatrol::core::monitor::MAX_INTERVAL_SECS;

    let monitor = monitor_with(alpha_beta_probe());
    assert!(matches!(
        monitor.set_interval("1e20"),
        Err(PatrolError::InvalidInterval)
    ));
    assert_eq!(monitor.interval_secs(), 1.0);

    let (mut subscription, _) = monitor.subscribe();
    let config = monitor.start(Some(vec!["alpha".into()]), Some("1e20".into()));
    assert_eq!(config.interval, MAX_INTERVAL_SECS);

    let snapshot = next_snapshot(&mut subscription).await;
    assert_eq!(row_names(&snapshot), ["alpha"]);
    assert!(monitor.results().is_some());
    monitor.stop().unwrap();
}

#[cfg(target_os = "linux")]
#[test]
fn test_long_process_names_match_in_full() {
    use pidpatrol::core::monitor::{ProcessProbe, Sampler, SysinfoProbe};
    use std::path::Path;
    use std::process::{Child, Command};
    use std::sync::Arc;

    const LONG_NAME: &str = "averyverylongprocessname";

    let source = Path::new("/bin/sleep");
    if !source.exists() {
        return;
    }

    let dir = tempfile::tempdir_in(env!("CARGO_TARGET_TMPDIR")).unwrap();
    let exe = dir.path().join(LONG_NAME);
    std::fs::copy(source, &exe).unwrap();

    // A freshly written binary can briefly report "text file busy"
    let mut spawned: Option<Child> = None;
    for _ in 0..10 {
        match Command::new(&exe).arg("30").spawn() {
            Ok(child) => {
                spawned = Some(child);
                break;
            }
            Err(_) => std::thread::sleep(Duration::from_millis(50)),
        }
    }
    let mut child = spawned.expect("copied binary should start");
    let child_pid = child.id();
    std::thread::sleep(Duration::from_millis(200));

    let probe = Arc::new(SysinfoProbe::new());
    let entry = probe.list().into_iter().find(|e| e.pid == child_pid);
    let sample = Sampler::with_settle(probe, Duration::from_millis(50)).sample(LONG_NAME);

    let _ = child.kill();
    let _ = child.wait();

    let Some(entry) = entry else {
        // Restricted sandboxes may hide the process table
        return;
    };
    assert_eq!(entry.name, LONG_NAME);
    assert!(sample.is_found());
    assert!(sample.pids.contains(&child_pid));
}
