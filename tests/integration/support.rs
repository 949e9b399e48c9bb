// Shared helpers for engine tests

use pidpatrol::core::monitor::{
    FakeProcess, MemoryProbe, Monitor, MonitorEvent, MonitorOptions, Snapshot, Subscription,
};
use std::sync::Arc;
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(5);

/// alpha runs as two processes, beta as one, on a 4-core machine
pub fn alpha_beta_probe() -> Arc<MemoryProbe> {
    Arc::new(MemoryProbe::with_processes(
        4,
        vec![
            FakeProcess::new(10, "alpha").cpu(10.0).memory(8 * 1024 * 1024),
            FakeProcess::new(11, "alpha").cpu(20.0).memory(8 * 1024 * 1024),
            FakeProcess::new(20, "beta").cpu(4.0).memory(1024 * 1024),
            FakeProcess::new(30, "gamma"),
        ],
    ))
}

pub fn fast_options() -> MonitorOptions {
    MonitorOptions {
        interval_secs: 1.0,
        settle_delay: Duration::ZERO,
        ..Default::default()
    }
}

pub fn monitor_with(probe: Arc<MemoryProbe>) -> Monitor {
    Monitor::new(fast_options(), probe).expect("test runs inside a Tokio runtime")
}

/// Wait for the next snapshot, skipping lifecycle events
pub async fn next_snapshot(subscription: &mut Subscription) -> Snapshot {
    tokio::time::timeout(WAIT, async {
        loop {
            let event = subscription.recv().await.expect("subscription closed");
            if let MonitorEvent::Snapshot(snapshot) = event.as_ref() {
                return snapshot.clone();
            }
        }
    })
    .await
    .expect("no snapshot within timeout")
}

/// Wait for a snapshot that satisfies `accept`
pub async fn snapshot_where(
    subscription: &mut Subscription,
    accept: impl Fn(&Snapshot) -> bool,
) -> Snapshot {
    tokio::time::timeout(WAIT * 2, async {
        loop {
            let snapshot = next_snapshot(subscription).await;
            if accept(&snapshot) {
                return snapshot;
            }
        }
    })
    .await
    .expect("no matching snapshot within timeout")
}

pub fn row_names(snapshot: &Snapshot) -> Vec<&str> {
    snapshot.rows.iter().map(|r| r.name.as_str()).collect()
}
