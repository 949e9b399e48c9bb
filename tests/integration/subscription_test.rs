// Push subscription behavior

use super::support::*;
use pidpatrol::core::monitor::{MonitorEvent, TryRecvError};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lifecycle_events_in_order() {
    let monitor = monitor_with(alpha_beta_probe());
    let (mut subscription, _) = monitor.subscribe();

    monitor.configure(["beta"]).unwrap();
    monitor.start(None, None);

    let first = subscription.recv().await.unwrap();
    assert_eq!(first.kind(), "config_updated");
    let second = subscription.recv().await.unwrap();
    match second.as_ref() {
        MonitorEvent::MonitoringStarted { config } => {
            assert!(config.running);
            assert_eq!(config.names(), vec!["beta"]);
        }
        other => panic!("expected monitoring_started, got {}", other.kind()),
    }

    next_snapshot(&mut subscription).await;
    monitor.stop().unwrap();

    let stopped = tokio::time::timeout(WAIT, async {
        loop {
            let event = subscription.recv().await.unwrap();
            if let MonitorEvent::MonitoringStopped { config } = event.as_ref() {
                return config.clone();
            }
        }
    })
    .await
    .unwrap();
    assert!(!stopped.running);
    assert_eq!(stopped.names(), vec!["beta"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_late_subscriber_gets_bootstrap() {
    let monitor = monitor_with(alpha_beta_probe());
    let (mut early, bootstrap) = monitor.subscribe();
    assert!(bootstrap.is_none());

    monitor.start(Some(vec!["alpha".into()]), None);
    let seen = next_snapshot(&mut early).await;

    let (mut late, bootstrap) = monitor.subscribe();
    let bootstrap = bootstrap.expect("snapshot available after first tick");
    assert_eq!(bootstrap.rows[0].name, "alpha");
    assert!(bootstrap.tick >= seen.tick);

    // The next push is never older than the bootstrap
    let pushed = next_snapshot(&mut late).await;
    assert!(pushed.tick > bootstrap.tick);
    monitor.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsubscribe_closes_stream() {
    let monitor = monitor_with(alpha_beta_probe());
    let (mut subscription, _) = monitor.subscribe();
    assert_eq!(monitor.subscriber_count(), 1);

    assert!(monitor.unsubscribe(subscription.id()));
    assert!(!monitor.unsubscribe(subscription.id()));
    assert_eq!(monitor.subscriber_count(), 0);

    monitor.configure(["alpha"]).unwrap();
    assert!(matches!(subscription.try_recv(), Err(TryRecvError::Disconnected)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stalled_subscriber_is_dropped() {
    let monitor = pidpatrol::Monitor::new(
        pidpatrol::MonitorOptions {
            subscriber_buffer: 2,
            ..fast_options()
        },
        alpha_beta_probe(),
    )
    .unwrap();
    let (mut stalled, _) = monitor.subscribe();
    let (mut healthy, _) = monitor.subscribe();

    for name in ["alpha", "beta", "gamma"] {
        monitor.configure([name]).unwrap();
        healthy.try_recv().unwrap();
    }

    assert_eq!(monitor.subscriber_count(), 1);
    // Buffered events are still readable before the stream ends
    assert!(stalled.try_recv().is_ok());
    assert!(stalled.try_recv().is_ok());
    assert!(matches!(stalled.try_recv(), Err(TryRecvError::Disconnected)));
}
