//! Per-name process sampling and aggregation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use super::names::name_key;
use super::probe::{ProcessProbe, ProcessReading};
use super::sample::{ProcessSample, ProcessStatus};
use crate::utils::time_stamp;

/// Delay between priming CPU accounting and reading it back.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Maps a watched name to an aggregated [`ProcessSample`].
///
/// Matching is exact and case-insensitive: `chrome.exe` does not match
/// `chrome`. Sampling blocks for the settle delay, so callers inside an async
/// runtime must run it on the blocking pool.
#[derive(Clone)]
pub struct Sampler {
    probe: Arc<dyn ProcessProbe>,
    settle: Duration,
}

impl Sampler {
    pub fn new(probe: Arc<dyn ProcessProbe>) -> Self {
        Self::with_settle(probe, DEFAULT_SETTLE_DELAY)
    }

    pub fn with_settle(probe: Arc<dyn ProcessProbe>, settle: Duration) -> Self {
        Self { probe, settle }
    }

    pub fn logical_cpus(&self) -> usize {
        self.probe.logical_cpus().max(1)
    }

    /// Sample every live process named `name`. Never fails: processes that
    /// exit or deny access mid-sample are left out of the aggregate.
    pub fn sample(&self, name: &str) -> ProcessSample {
        let target = name_key(name);
        if target.is_empty() {
            return ProcessSample::not_found(name);
        }

        let mut seen = HashSet::new();
        let pids: Vec<u32> = self
            .probe
            .list()
            .into_iter()
            .filter(|entry| entry.name.to_lowercase() == target)
            .map(|entry| entry.pid)
            .filter(|pid| seen.insert(*pid))
            .collect();

        if pids.is_empty() {
            log::trace!("No process matches '{}'", name);
            return ProcessSample::not_found(name);
        }

        let readings = self.probe.measure(&pids, self.settle);
        aggregate(name, &pids, &readings, self.logical_cpus())
    }
}

/// Fold per-process readings into one row.
///
/// `pids` carries the enumeration order; readings for PIDs outside it are
/// ignored, and PIDs without a reading did not survive the re-check.
pub fn aggregate(
    name: &str,
    pids: &[u32],
    readings: &[ProcessReading],
    logical_cpus: usize,
) -> ProcessSample {
    let by_pid: HashMap<u32, &ProcessReading> = readings.iter().map(|r| (r.pid, r)).collect();

    let survivors: Vec<&ProcessReading> = pids
        .iter()
        .filter_map(|pid| by_pid.get(pid).copied())
        .collect();

    if survivors.is_empty() {
        return ProcessSample::not_found(name);
    }

    let cpu_sum: f64 = survivors.iter().map(|r| r.cpu_percent.max(0.0)).sum();
    let memory_bytes: u64 = survivors.iter().map(|r| r.memory_bytes).sum();
    let cpu_normalized = (cpu_sum / logical_cpus.max(1) as f64).min(100.0);

    ProcessSample {
        name: name.to_string(),
        pids: survivors.iter().map(|r| r.pid).collect(),
        status: dominant_status(&survivors),
        cpu_percent: round3(cpu_normalized),
        cpu_percent_sum: round3(cpu_sum),
        memory_mb: round3(memory_bytes as f64 / BYTES_PER_MB),
        last_checked: time_stamp(),
    }
}

/// `running` wins outright; otherwise the most common state, ties going to
/// the state seen first.
fn dominant_status(readings: &[&ProcessReading]) -> ProcessStatus {
    if readings.iter().any(|r| r.status == ProcessStatus::Running) {
        return ProcessStatus::Running;
    }

    let mut counts: Vec<(&ProcessStatus, usize)> = Vec::new();
    for reading in readings {
        match counts.iter_mut().find(|(status, _)| **status == reading.status) {
            Some((_, count)) => *count += 1,
            None => counts.push((&reading.status, 1)),
        }
    }

    let mut best: Option<(&ProcessStatus, usize)> = None;
    for (status, count) in counts {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((status, count)),
        }
    }

    best.map(|(status, _)| status.clone())
        .unwrap_or(ProcessStatus::NotFound)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
