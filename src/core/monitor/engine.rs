//! The monitor engine: one owned state behind one lock, plus the poll loop
//! and the broadcast hub that hang off it.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

use super::events::{ConfigView, MonitorEvent, Snapshot};
use super::hub::{BroadcastHub, SubscriberId, Subscription, DEFAULT_SUBSCRIBER_BUFFER};
use super::poll::poll_loop;
use super::probe::ProcessProbe;
use super::sample::ProcessSample;
use super::sampler::{Sampler, DEFAULT_SETTLE_DELAY};
use super::state::{IntervalValue, MonitorState, StartOutcome, DEFAULT_INTERVAL_SECS};
use crate::error::{PatrolError, Result};

/// Tunables for a [`Monitor`]
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub interval_secs: f64,
    pub settle_delay: Duration,
    pub subscriber_buffer: usize,
    /// Watch list the monitor starts with
    pub watch: Vec<String>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            settle_delay: DEFAULT_SETTLE_DELAY,
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            watch: Vec::new(),
        }
    }
}

pub(crate) struct Inner {
    pub(crate) state: MonitorState,
    poll: Option<PollHandle>,
}

struct PollHandle {
    run_id: u64,
    shutdown_tx: broadcast::Sender<()>,
}

pub(crate) struct Shared {
    pub(crate) inner: Mutex<Inner>,
    pub(crate) hub: BroadcastHub,
    pub(crate) sampler: Sampler,
}

impl Shared {
    /// Store a finished tick and push it to subscribers, both under the
    /// state lock so a concurrent `stop` either sees the tick published or
    /// prevents it entirely.
    pub(crate) fn commit(&self, run_id: u64, rows: Vec<ProcessSample>) -> bool {
        let mut inner = self.inner.lock();
        if !inner.state.commit(run_id, rows) {
            return false;
        }

        if let Some(snapshot) = inner.state.snapshot() {
            log::debug!(
                "Tick {} committed with {} row(s)",
                snapshot.tick,
                snapshot.rows.len()
            );
            self.hub.publish(MonitorEvent::Snapshot(snapshot));
        }
        true
    }

    /// Watch list and interval for the next tick of `run_id`, or `None`
    /// when that run is over.
    pub(crate) fn tick_plan(&self, run_id: u64) -> Option<(Vec<String>, Duration)> {
        let inner = self.inner.lock();
        if !inner.state.is_current(run_id) {
            return None;
        }
        let interval = Duration::try_from_secs_f64(inner.state.interval_secs())
            .unwrap_or(Duration::from_secs_f64(DEFAULT_INTERVAL_SECS));
        Some((inner.state.watch_list().to_vec(), interval))
    }
}

/// Handle to the process monitoring engine.
///
/// Cloning is cheap; all clones drive the same state. Every operation takes
/// the state lock once and either applies fully or returns an error without
/// touching anything.
#[derive(Clone)]
pub struct Monitor {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl Monitor {
    /// Create a monitor bound to the current Tokio runtime.
    pub fn new(options: MonitorOptions, probe: Arc<dyn ProcessProbe>) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| PatrolError::runtime(format!("no Tokio runtime available: {}", e)))?;
        Ok(Self::with_runtime(runtime, options, probe))
    }

    /// Create a monitor that spawns its poll loop on `runtime`.
    pub fn with_runtime(
        runtime: Handle,
        options: MonitorOptions,
        probe: Arc<dyn ProcessProbe>,
    ) -> Self {
        let shared = Shared {
            inner: Mutex::new(Inner {
                state: MonitorState::new(options.interval_secs, options.watch),
                poll: None,
            }),
            hub: BroadcastHub::with_buffer(options.subscriber_buffer),
            sampler: Sampler::with_settle(probe, options.settle_delay),
        };

        Self {
            shared: Arc::new(shared),
            runtime,
        }
    }

    pub fn sampler(&self) -> &Sampler {
        &self.shared.sampler
    }

    /// Replace the watch list.
    pub fn configure<I, S>(&self, names: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.mutate(|state| state.configure(names).map(<[String]>::to_vec))
    }

    pub fn set_interval(&self, value: impl Into<IntervalValue>) -> Result<f64> {
        let value = value.into();
        self.mutate(|state| state.set_interval(&value))
    }

    /// Merge names into the watch list.
    pub fn add<I, S>(&self, names: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.mutate(|state| state.add(names).map(<[String]>::to_vec))
    }

    pub fn remove(&self, name: &str) -> Result<Vec<String>> {
        self.mutate(|state| state.remove(name).map(<[String]>::to_vec))
    }

    /// Start monitoring, or re-apply overrides if already running.
    pub fn start(&self, names: Option<Vec<String>>, interval: Option<IntervalValue>) -> ConfigView {
        let mut inner = self.shared.inner.lock();
        let StartOutcome { started, run_id } = inner.state.start(names, interval.as_ref());

        if started {
            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            self.runtime.spawn(poll_loop(
                Arc::downgrade(&self.shared),
                self.shared.sampler.clone(),
                run_id,
                shutdown_rx,
            ));
            inner.poll = Some(PollHandle {
                run_id,
                shutdown_tx,
            });
            log::info!(
                "Monitoring started (run {}, {} process name(s), every {}s)",
                run_id,
                inner.state.watch_list().len(),
                inner.state.interval_secs()
            );
        } else {
            log::info!("Monitoring already running, overrides applied");
        }

        let config = inner.state.config_view();
        self.shared.hub.publish(MonitorEvent::MonitoringStarted {
            config: config.clone(),
        });
        config
    }

    /// Stop monitoring. Once this returns the stopped run will neither
    /// commit nor publish another snapshot.
    pub fn stop(&self) -> Result<ConfigView> {
        let mut inner = self.shared.inner.lock();
        inner.state.stop()?;

        if let Some(poll) = inner.poll.take() {
            // The receiver may already be gone if the loop exited on its own
            let _ = poll.shutdown_tx.send(());
            log::info!("Monitoring stopped (run {})", poll.run_id);
        }

        let config = inner.state.config_view();
        self.shared.hub.publish(MonitorEvent::MonitoringStopped {
            config: config.clone(),
        });
        Ok(config)
    }

    pub fn status(&self) -> ConfigView {
        self.shared.inner.lock().state.config_view()
    }

    pub fn is_running(&self) -> bool {
        self.shared.inner.lock().state.is_running()
    }

    pub fn interval_secs(&self) -> f64 {
        self.shared.inner.lock().state.interval_secs()
    }

    pub fn watch_list(&self) -> Vec<String> {
        self.shared.inner.lock().state.watch_list().to_vec()
    }

    /// Latest snapshot; `None` means there is nothing to show.
    pub fn results(&self) -> Option<Snapshot> {
        self.shared.inner.lock().state.snapshot()
    }

    /// Register an observer and hand back the current snapshot with it.
    ///
    /// Registration and the bootstrap read happen under the state lock, so
    /// the first pushed snapshot is always the one after the bootstrap.
    pub fn subscribe(&self) -> (Subscription, Option<Snapshot>) {
        let inner = self.shared.inner.lock();
        let subscription = self.shared.hub.subscribe();
        (subscription, inner.state.snapshot())
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.shared.hub.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.hub.len()
    }

    /// Apply a configuration transition and announce it.
    fn mutate<T>(&self, op: impl FnOnce(&mut MonitorState) -> Result<T>) -> Result<T> {
        let mut inner = self.shared.inner.lock();
        let out = op(&mut inner.state)?;

        log::debug!(
            "Configuration updated: {:?} every {}s",
            inner.state.watch_list(),
            inner.state.interval_secs()
        );
        self.shared.hub.publish(MonitorEvent::ConfigUpdated {
            config: inner.state.config_view(),
        });
        Ok(out)
    }
}
