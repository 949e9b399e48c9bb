use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::utils::time_stamp;

/// Aggregated state of a watched process name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    Running,
    NotFound,
    /// OS-reported state in lowercase, e.g. `sleeping` or `zombie`
    Other(String),
}

impl ProcessStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::NotFound => "not_found",
            ProcessStatus::Other(s) => s,
        }
    }

    /// Build a status from an OS-reported state string.
    pub fn from_os(state: &str) -> Self {
        match state.trim().to_lowercase().as_str() {
            "running" | "run" | "runnable" => ProcessStatus::Running,
            "not_found" | "" => ProcessStatus::NotFound,
            other => ProcessStatus::Other(other.to_string()),
        }
    }

    /// Human-readable label (`not found` instead of `not_found`).
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProcessStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProcessStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ProcessStatus::from_os(&raw))
    }
}

/// One aggregated row: every live OS process matching `name` at sample time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    pub name: String,
    pub pids: Vec<u32>,
    pub status: ProcessStatus,
    /// Summed CPU normalized onto a single 0-100 scale
    pub cpu_percent: f64,
    /// Raw sum of per-process CPU percentages (can exceed 100)
    pub cpu_percent_sum: f64,
    pub memory_mb: f64,
    pub last_checked: String,
}

impl ProcessSample {
    /// The canonical row for a name with no live matches.
    pub fn not_found(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pids: Vec::new(),
            status: ProcessStatus::NotFound,
            cpu_percent: 0.0,
            cpu_percent_sum: 0.0,
            memory_mb: 0.0,
            last_checked: time_stamp(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.status != ProcessStatus::NotFound
    }

    /// First matched PID, if any.
    pub fn pid(&self) -> Option<u32> {
        self.pids.first().copied()
    }
}
