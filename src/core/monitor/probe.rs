//! Process table access.
//!
//! The sampler talks to the operating system only through [`ProcessProbe`].
//! [`SysinfoProbe`] is the production implementation; [`MemoryProbe`] serves
//! a fixed, editable table and is used for tests and dry runs.

use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use sysinfo::{
    CpuRefreshKind, Pid, Process, ProcessRefreshKind, ProcessStatus as OsStatus,
    ProcessesToUpdate, RefreshKind, System, UpdateKind,
};

use super::sample::ProcessStatus;

/// A process as seen during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

/// CPU and memory reading of one process after the settle delay.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReading {
    pub pid: u32,
    /// Percent of one core; a busy multi-threaded process can exceed 100
    pub cpu_percent: f64,
    /// Resident set size in bytes
    pub memory_bytes: u64,
    pub status: ProcessStatus,
}

/// Trait for process table providers
///
/// Implementations must absorb per-process failures (permission denied,
/// process exited) by leaving that process out of the result.
pub trait ProcessProbe: Send + Sync {
    /// Enumerate live processes, in a stable order.
    fn list(&self) -> Vec<ProcessEntry>;

    /// Prime CPU accounting for `pids`, wait `settle` once, then read CPU,
    /// memory and state of every process that is still accessible.
    fn measure(&self, pids: &[u32], settle: Duration) -> Vec<ProcessReading>;

    /// Number of logical CPU cores (at least 1).
    fn logical_cpus(&self) -> usize;
}

/// Process probe backed by `sysinfo`.
pub struct SysinfoProbe {
    logical_cpus: usize,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let system =
            System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));

        Self {
            logical_cpus: system.cpus().len().max(1),
        }
    }

    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::nothing().with_cpu().with_memory()
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SysinfoProbe {
    fn list(&self) -> Vec<ProcessEntry> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cmd(UpdateKind::OnlyIfNotSet)
                .with_exe(UpdateKind::OnlyIfNotSet),
        );

        let mut entries: Vec<_> = system
            .processes()
            .values()
            // Threads show up as processes on Linux; they share the parent's PID group
            .filter(|proc| proc.thread_kind().is_none())
            .map(|proc| ProcessEntry {
                pid: proc.pid().as_u32(),
                name: process_name(proc),
            })
            .collect();

        entries.sort_by_key(|entry| entry.pid);
        entries
    }

    fn measure(&self, pids: &[u32], settle: Duration) -> Vec<ProcessReading> {
        if pids.is_empty() {
            return Vec::new();
        }

        let targets: Vec<Pid> = pids.iter().map(|&pid| Pid::from_u32(pid)).collect();
        let mut system = System::new();

        // First refresh only establishes the CPU baseline
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&targets),
            true,
            Self::refresh_kind(),
        );
        std::thread::sleep(settle);
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&targets),
            true,
            Self::refresh_kind(),
        );

        targets
            .iter()
            .filter_map(|pid| system.process(*pid))
            .map(|proc| ProcessReading {
                pid: proc.pid().as_u32(),
                cpu_percent: f64::from(proc.cpu_usage()),
                memory_bytes: proc.memory(),
                status: status_from_os(proc.status()),
            })
            .collect()
    }

    fn logical_cpus(&self) -> usize {
        self.logical_cpus
    }
}

/// Length at which Linux cuts the kernel `comm` name.
const COMM_LEN: usize = 15;

/// Full process name.
///
/// The kernel keeps only the first 15 bytes of a process name. When the
/// short name looks cut, the file name of `argv[0]` or of the executable is
/// used instead, provided it starts with the short name.
fn process_name(proc: &Process) -> String {
    let comm = proc.name().to_string_lossy().to_string();
    let argv0 = proc.cmd().first().map(|arg| arg.to_string_lossy().to_string());
    let exe = proc.exe().and_then(file_name);

    resolve_name(comm, argv0.as_deref().and_then(|arg| file_name(Path::new(arg))), exe)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().to_string())
}

fn resolve_name(comm: String, argv0: Option<String>, exe: Option<String>) -> String {
    if comm.len() < COMM_LEN {
        return comm;
    }

    [argv0, exe]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.len() > comm.len() && candidate.starts_with(&comm))
        .unwrap_or(comm)
}

/// Map an OS state onto the lowercase labels used in result rows.
fn status_from_os(status: OsStatus) -> ProcessStatus {
    let label = match status {
        OsStatus::Run => return ProcessStatus::Running,
        OsStatus::Idle => "idle",
        OsStatus::Sleep => "sleeping",
        OsStatus::Stop => "stopped",
        OsStatus::Zombie => "zombie",
        OsStatus::Tracing => "tracing-stop",
        OsStatus::Dead => "dead",
        OsStatus::Wakekill => "wake-kill",
        OsStatus::Waking => "waking",
        OsStatus::Parked => "parked",
        OsStatus::LockBlocked => "locked",
        OsStatus::UninterruptibleDiskSleep => "disk-sleep",
        #[allow(unreachable_patterns)]
        _ => "unknown",
    };
    ProcessStatus::Other(label.to_string())
}

/// A process in a [`MemoryProbe`] table.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeProcess {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub memory_bytes: u64,
    pub status: ProcessStatus,
    /// When false the process is listed but vanishes before it can be measured
    pub accessible: bool,
}

impl FakeProcess {
    pub fn new(pid: u32, name: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            cpu_percent: 0.0,
            memory_bytes: 0,
            status: ProcessStatus::Running,
            accessible: true,
        }
    }

    pub fn cpu(mut self, percent: f64) -> Self {
        self.cpu_percent = percent;
        self
    }

    pub fn memory(mut self, bytes: u64) -> Self {
        self.memory_bytes = bytes;
        self
    }

    pub fn status(mut self, status: ProcessStatus) -> Self {
        self.status = status;
        self
    }

    pub fn inaccessible(mut self) -> Self {
        self.accessible = false;
        self
    }
}

/// In-memory process table.
#[derive(Debug)]
pub struct MemoryProbe {
    logical_cpus: usize,
    table: Mutex<Vec<FakeProcess>>,
    measure_calls: AtomicUsize,
}

impl MemoryProbe {
    pub fn new(logical_cpus: usize) -> Self {
        Self {
            logical_cpus: logical_cpus.max(1),
            table: Mutex::new(Vec::new()),
            measure_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_processes(logical_cpus: usize, processes: Vec<FakeProcess>) -> Self {
        let probe = Self::new(logical_cpus);
        probe.set_processes(processes);
        probe
    }

    /// Replace the whole table.
    pub fn set_processes(&self, processes: Vec<FakeProcess>) {
        *self.table.lock() = processes;
    }

    pub fn spawn(&self, process: FakeProcess) {
        self.table.lock().push(process);
    }

    /// Remove a process; returns whether it existed.
    pub fn kill(&self, pid: u32) -> bool {
        let mut table = self.table.lock();
        let before = table.len();
        table.retain(|p| p.pid != pid);
        table.len() != before
    }

    /// How many times `measure` ran (one settle delay each).
    pub fn measure_calls(&self) -> usize {
        self.measure_calls.load(Ordering::Relaxed)
    }
}

impl ProcessProbe for MemoryProbe {
    fn list(&self) -> Vec<ProcessEntry> {
        self.table
            .lock()
            .iter()
            .map(|p| ProcessEntry {
                pid: p.pid,
                name: p.name.clone(),
            })
            .collect()
    }

    fn measure(&self, pids: &[u32], settle: Duration) -> Vec<ProcessReading> {
        self.measure_calls.fetch_add(1, Ordering::Relaxed);
        if !settle.is_zero() {
            std::thread::sleep(settle);
        }

        let table = self.table.lock();
        pids.iter()
            .filter_map(|pid| table.iter().find(|p| p.pid == *pid && p.accessible))
            .map(|p| ProcessReading {
                pid: p.pid,
                cpu_percent: p.cpu_percent,
                memory_bytes: p.memory_bytes,
                status: p.status.clone(),
            })
            .collect()
    }

    fn logical_cpus(&self) -> usize {
        self.logical_cpus
    }
}
