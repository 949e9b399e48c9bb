//! Monitor state and its transitions.
//!
//! [`MonitorState`] is plain data. Every transition either fully applies or
//! returns an error and leaves the state untouched. Locking and task
//! management live in [`super::engine`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::events::{ConfigView, ProcessRef, Snapshot};
use super::names::{merge_names, name_key, normalize, same_name};
use super::sample::ProcessSample;
use crate::error::{PatrolError, Result};
use crate::utils::time_stamp;

/// Shortest polling interval, in seconds.
pub const MIN_INTERVAL_SECS: f64 = 1.0;
/// Longest polling interval, in seconds (one day).
pub const MAX_INTERVAL_SECS: f64 = 86_400.0;
pub const DEFAULT_INTERVAL_SECS: f64 = 5.0;

/// A caller-supplied interval before numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntervalValue {
    Number(f64),
    Text(String),
}

impl IntervalValue {
    /// Read an interval out of arbitrary JSON. Non-numeric, non-string
    /// values are kept as text so coercion reports them as invalid.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(IntervalValue::Number)
                .unwrap_or_else(|| IntervalValue::Text(n.to_string())),
            Value::String(s) => IntervalValue::Text(s.clone()),
            other => IntervalValue::Text(other.to_string()),
        }
    }

    /// Coerce to a finite number of seconds.
    pub fn coerce(&self) -> Result<f64> {
        let value = match self {
            IntervalValue::Number(v) => *v,
            IntervalValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| PatrolError::InvalidInterval)?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(PatrolError::InvalidInterval)
        }
    }
}

/// Pull a coerced interval into `[MIN_INTERVAL_SECS, MAX_INTERVAL_SECS]`.
pub fn clamp_interval(secs: f64) -> f64 {
    secs.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS)
}

impl From<f64> for IntervalValue {
    fn from(value: f64) -> Self {
        IntervalValue::Number(value)
    }
}

impl From<i32> for IntervalValue {
    fn from(value: i32) -> Self {
        IntervalValue::Number(f64::from(value))
    }
}

impl From<&str> for IntervalValue {
    fn from(value: &str) -> Self {
        IntervalValue::Text(value.to_string())
    }
}

impl From<String> for IntervalValue {
    fn from(value: String) -> Self {
        IntervalValue::Text(value)
    }
}

/// What a `start` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOutcome {
    /// True on a `Stopped -> Running` transition, false when already running
    pub started: bool,
    pub run_id: u64,
}

/// The single source of truth for one monitor.
#[derive(Debug, Clone)]
pub struct MonitorState {
    running: bool,
    interval_secs: f64,
    watch_list: Vec<String>,
    last_snapshot: Vec<ProcessSample>,
    snapshot_taken: Option<String>,
    ticks: u64,
    run_id: u64,
}

impl MonitorState {
    pub fn new(interval_secs: f64, watch_list: Vec<String>) -> Self {
        Self {
            running: false,
            interval_secs: if interval_secs.is_finite() {
                clamp_interval(interval_secs)
            } else {
                DEFAULT_INTERVAL_SECS
            },
            watch_list: normalize(watch_list),
            last_snapshot: Vec::new(),
            snapshot_taken: None,
            ticks: 0,
            run_id: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    pub fn watch_list(&self) -> &[String] {
        &self.watch_list
    }

    pub fn last_snapshot(&self) -> &[ProcessSample] {
        &self.last_snapshot
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Whether a poll loop spawned for `run_id` may still commit results.
    pub fn is_current(&self, run_id: u64) -> bool {
        self.running && self.run_id == run_id
    }

    /// Replace the watch list. Fails when nothing survives normalization.
    pub fn configure<I, S>(&mut self, names: I) -> Result<&[String]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = normalize(names);
        if names.is_empty() {
            return Err(PatrolError::invalid_config("missing processes"));
        }
        self.watch_list = names;
        Ok(&self.watch_list)
    }

    /// Store a new polling interval. Values outside one second to one day
    /// are rejected.
    pub fn set_interval(&mut self, value: &IntervalValue) -> Result<f64> {
        let secs = value.coerce()?;
        if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
            return Err(PatrolError::InvalidInterval);
        }
        self.interval_secs = secs;
        Ok(secs)
    }

    /// Enter `Running`, applying optional overrides first.
    ///
    /// A non-empty name list replaces the watch list. An interval override is
    /// clamped into range; one that cannot be coerced is ignored. Calling
    /// this while already running keeps the current run and only applies the
    /// overrides.
    pub fn start(
        &mut self,
        names: Option<Vec<String>>,
        interval: Option<&IntervalValue>,
    ) -> StartOutcome {
        if let Some(names) = names {
            let names = normalize(names);
            if !names.is_empty() {
                self.watch_list = names;
            }
        }

        if let Some(value) = interval {
            match value.coerce() {
                Ok(secs) => self.interval_secs = clamp_interval(secs),
                Err(_) => log::warn!("Ignoring invalid interval override {:?}", value),
            }
        }

        let started = !self.running;
        if started {
            self.running = true;
            self.run_id += 1;
            self.clear_snapshot();
        }

        StartOutcome {
            started,
            run_id: self.run_id,
        }
    }

    /// Enter `Stopped`. The watch list and interval stay; the snapshot goes.
    pub fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Err(PatrolError::NotRunning);
        }
        self.running = false;
        self.clear_snapshot();
        Ok(())
    }

    /// Merge names into the watch list.
    ///
    /// Fails with `InvalidConfig` when the input is empty and with
    /// `DuplicateEntry` when every name is already watched.
    pub fn add<I, S>(&mut self, names: I) -> Result<&[String]>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let incoming = normalize(names);
        if incoming.is_empty() {
            return Err(PatrolError::invalid_config("empty names"));
        }

        let merged = merge_names(&self.watch_list, &incoming);
        if merged.len() == self.watch_list.len() {
            return Err(PatrolError::duplicate_entry(incoming.join(", ")));
        }

        self.configure(merged)
    }

    /// Remove every entry equal to `name`, ignoring case.
    pub fn remove(&mut self, name: &str) -> Result<&[String]> {
        if name_key(name).is_empty() {
            return Err(PatrolError::invalid_config("missing name"));
        }
        if !self.watch_list.iter().any(|n| same_name(n, name)) {
            return Err(PatrolError::not_found(name.trim()));
        }

        self.watch_list.retain(|n| !same_name(n, name));
        Ok(&self.watch_list)
    }

    /// Store a completed tick. Returns false, storing nothing, when the
    /// tick belongs to a run that has been stopped or superseded.
    pub fn commit(&mut self, run_id: u64, rows: Vec<ProcessSample>) -> bool {
        if !self.is_current(run_id) {
            return false;
        }
        self.last_snapshot = rows;
        self.snapshot_taken = Some(time_stamp());
        self.ticks += 1;
        true
    }

    pub fn config_view(&self) -> ConfigView {
        ConfigView {
            running: self.running,
            interval: self.interval_secs,
            processes: ProcessRef::list(&self.watch_list),
        }
    }

    /// The current snapshot, or `None` when there is nothing to show:
    /// monitoring is stopped, nothing is watched, or no tick completed yet.
    pub fn snapshot(&self) -> Option<Snapshot> {
        if !self.running || self.watch_list.is_empty() {
            return None;
        }
        let timestamp = self.snapshot_taken.clone()?;

        Some(Snapshot {
            timestamp,
            tick: self.ticks,
            running: self.running,
            interval: self.interval_secs,
            processes: ProcessRef::list(&self.watch_list),
            rows: self.last_snapshot.clone(),
        })
    }

    fn clear_snapshot(&mut self) {
        self.last_snapshot.clear();
        self.snapshot_taken = None;
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_SECS, Vec::new())
    }
}
