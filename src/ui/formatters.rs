use colored::*;

use crate::core::monitor::ProcessStatus;

/// Format a MiB figure, switching to GiB past 1024
pub fn format_memory(memory_mb: f64) -> String {
    if memory_mb >= 1024.0 {
        format!("{:.2}GB", memory_mb / 1024.0)
    } else {
        format!("{:.1}MB", memory_mb)
    }
}

pub fn format_cpu(cpu_percent: f64) -> String {
    format!("{:.1}%", cpu_percent)
}

/// Comma-separated PID list, `-` when empty, elided past `max` entries
pub fn format_pids(pids: &[u32], max: usize) -> String {
    if pids.is_empty() {
        return "-".to_string();
    }

    let shown: Vec<String> = pids.iter().take(max).map(|p| p.to_string()).collect();
    if pids.len() > max {
        format!("{} (+{})", shown.join(","), pids.len() - max)
    } else {
        shown.join(",")
    }
}

/// Status label padded to `width` and colored by state
pub fn format_status(status: &ProcessStatus, width: usize) -> ColoredString {
    let label = format!("{:<width$}", status.label(), width = width);
    match status {
        ProcessStatus::Running => label.as_str().green(),
        ProcessStatus::NotFound => label.as_str().bright_black(),
        ProcessStatus::Other(s) if s == "zombie" || s == "dead" => label.as_str().red(),
        ProcessStatus::Other(_) => label.as_str().yellow(),
    }
}

/// Color a CPU figure by load
pub fn colorize_cpu(cpu_percent: f64, text: &str) -> ColoredString {
    if cpu_percent >= 80.0 {
        text.red().bold()
    } else if cpu_percent >= 40.0 {
        text.yellow()
    } else {
        text.normal()
    }
}
