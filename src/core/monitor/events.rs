//! Payloads pushed to subscribers.

use serde::{Deserialize, Serialize};

use super::sample::ProcessSample;

/// A watched name as it appears on the wire: `{"name": "python"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRef {
    pub name: String,
}

impl ProcessRef {
    pub fn list(names: &[String]) -> Vec<ProcessRef> {
        names
            .iter()
            .map(|name| ProcessRef { name: name.clone() })
            .collect()
    }
}

/// Current monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigView {
    pub running: bool,
    pub interval: f64,
    pub processes: Vec<ProcessRef>,
}

impl ConfigView {
    pub fn names(&self) -> Vec<String> {
        self.processes.iter().map(|p| p.name.clone()).collect()
    }
}

/// One tick's worth of samples, in watch-list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    /// Monotonic tick counter within one monitor
    pub tick: u64,
    pub running: bool,
    pub interval: f64,
    pub processes: Vec<ProcessRef>,
    pub rows: Vec<ProcessSample>,
}

impl Snapshot {
    pub fn row(&self, name: &str) -> Option<&ProcessSample> {
        self.rows
            .iter()
            .find(|row| super::names::same_name(&row.name, name))
    }
}

/// Everything a subscriber can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    Snapshot(Snapshot),
    MonitoringStarted { config: ConfigView },
    MonitoringStopped { config: ConfigView },
    ConfigUpdated { config: ConfigView },
}

impl MonitorEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorEvent::Snapshot(_) => "snapshot",
            MonitorEvent::MonitoringStarted { .. } => "monitoring_started",
            MonitorEvent::MonitoringStopped { .. } => "monitoring_stopped",
            MonitorEvent::ConfigUpdated { .. } => "config_updated",
        }
    }

    pub fn as_snapshot(&self) -> Option<&Snapshot> {
        match self {
            MonitorEvent::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}
