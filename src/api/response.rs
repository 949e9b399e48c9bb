//! Response bodies.
//!
//! Field names match what the web dashboard and its tests consume. Every
//! success body carries `ok: true` and a local timestamp; errors use
//! [`ErrorResponse`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::monitor::{ConfigView, MonitorEvent, ProcessRef, ProcessSample, Snapshot};
use crate::error::PatrolError;
use crate::utils::time_stamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl From<&PatrolError> for ErrorResponse {
    fn from(err: &PatrolError) -> Self {
        Self {
            ok: false,
            error: err.to_string(),
        }
    }
}

/// Reply to configure, add and remove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessesResponse {
    pub ok: bool,
    pub processes: Vec<ProcessRef>,
    pub timestamp: String,
}

impl ProcessesResponse {
    pub fn new(names: &[String]) -> Self {
        Self {
            ok: true,
            processes: ProcessRef::list(names),
            timestamp: time_stamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalResponse {
    pub ok: bool,
    pub interval: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    pub ok: bool,
    pub interval: f64,
    pub processes: Vec<ProcessRef>,
    pub running: bool,
    pub timestamp: String,
}

impl From<ConfigView> for StartResponse {
    fn from(config: ConfigView) -> Self {
        Self {
            ok: true,
            interval: config.interval,
            processes: config.processes,
            running: config.running,
            timestamp: time_stamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopResponse {
    pub ok: bool,
    pub running: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub running: bool,
    pub interval: f64,
    pub processes: Vec<ProcessRef>,
    pub timestamp: String,
}

impl From<ConfigView> for StatusResponse {
    fn from(config: ConfigView) -> Self {
        Self {
            ok: true,
            running: config.running,
            interval: config.interval,
            processes: config.processes,
            timestamp: time_stamp(),
        }
    }
}

/// One row of `query_results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub name: String,
    /// First matched PID, `null` when nothing matched
    pub pid: Option<u32>,
    pub pids: Vec<u32>,
    /// Display status, e.g. `running` or `not found`
    pub status: String,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub last_checked: String,
}

impl From<&ProcessSample> for ResultRow {
    fn from(sample: &ProcessSample) -> Self {
        Self {
            name: sample.name.clone(),
            pid: sample.pid(),
            pids: sample.pids.clone(),
            status: sample.status.label(),
            cpu_percent: sample.cpu_percent,
            memory_mb: sample.memory_mb,
            last_checked: sample.last_checked.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub ok: bool,
    pub running: bool,
    pub interval: f64,
    pub count: usize,
    pub results: Vec<ResultRow>,
    pub timestamp: String,
}

impl From<&Snapshot> for ResultsResponse {
    fn from(snapshot: &Snapshot) -> Self {
        let results: Vec<ResultRow> = snapshot.rows.iter().map(ResultRow::from).collect();
        Self {
            ok: true,
            running: snapshot.running,
            interval: snapshot.interval,
            count: results.len(),
            results,
            timestamp: snapshot.timestamp.clone(),
        }
    }
}

/// JSON pushed to a subscriber for one event.
///
/// Snapshots use the `query_results` body plus `"type": "snapshot"`;
/// lifecycle events carry the configuration they produced.
pub fn push_message(event: &MonitorEvent) -> Value {
    match event {
        MonitorEvent::Snapshot(snapshot) => {
            let mut body = json!(ResultsResponse::from(snapshot));
            body["type"] = json!("snapshot");
            body["processes"] = json!(snapshot.processes);
            body
        }
        MonitorEvent::MonitoringStarted { config }
        | MonitorEvent::MonitoringStopped { config }
        | MonitorEvent::ConfigUpdated { config } => json!({
            "type": event.kind(),
            "config": config,
            "timestamp": time_stamp(),
        }),
    }
}
