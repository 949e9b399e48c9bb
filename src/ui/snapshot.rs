//! Table and JSON-lines output for snapshots and lifecycle events.

use anyhow::Result;
use colored::*;

use super::formatters::{colorize_cpu, format_cpu, format_memory, format_pids, format_status};
use crate::api::push_message;
use crate::core::monitor::{ConfigView, MonitorEvent, ProcessSample, Snapshot};
use crate::utils::format_interval;

const NAME_WIDTH: usize = 24;
const PID_WIDTH: usize = 22;
const MAX_PIDS: usize = 4;

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut out: String = name.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn print_row(sample: &ProcessSample) {
    let name = format!("{:<width$}", truncate(&sample.name, NAME_WIDTH), width = NAME_WIDTH);
    let pids = format!("{:<width$}", format_pids(&sample.pids, MAX_PIDS), width = PID_WIDTH);
    let cpu = format!("{:>7}", format_cpu(sample.cpu_percent));
    let memory = format!("{:>10}", format_memory(sample.memory_mb));

    let dimmed = !sample.is_found();
    let name = if dimmed { name.as_str().bright_black() } else { name.as_str().bold() };
    let pids = if dimmed { pids.as_str().bright_black() } else { pids.as_str().cyan() };

    println!(
        "{} │ {} │ {} │ {} │ {}",
        name,
        pids,
        format_status(&sample.status, 10),
        colorize_cpu(sample.cpu_percent, &cpu),
        memory.as_str().magenta()
    );
}

fn print_header() {
    let header = format!(
        "{:<name$} │ {:<pids$} │ {:<10} │ {:>7} │ {:>10}",
        "NAME",
        "PIDS",
        "STATUS",
        "CPU",
        "MEMORY",
        name = NAME_WIDTH,
        pids = PID_WIDTH
    );
    println!("{}", header.bold());
    println!("{}", "─".repeat(header.chars().count()));
}

/// Print one snapshot as a table
pub fn print_snapshot(snapshot: &Snapshot) {
    println!();
    println!(
        "{} {} {}",
        format!("Tick {}", snapshot.tick).bright_cyan().bold(),
        snapshot.timestamp.dimmed(),
        format!("(every {})", format_interval(snapshot.interval)).dimmed()
    );
    print_header();

    if snapshot.rows.is_empty() {
        println!("{}", "No processes watched".dimmed());
        return;
    }

    for row in &snapshot.rows {
        print_row(row);
    }
}

/// Print a one-shot sample
pub fn print_sample(sample: &ProcessSample) {
    print_header();
    print_row(sample);
    if sample.pids.len() > MAX_PIDS {
        println!("{} {}", "All PIDs:".dimmed(), format_pids(&sample.pids, usize::MAX));
    }
    if sample.is_found() {
        println!(
            "{} {}",
            "CPU across all cores:".dimmed(),
            format_cpu(sample.cpu_percent_sum)
        );
    }
}

fn print_config_line(label: &str, config: &ConfigView) {
    let names = config.names();
    let watched = if names.is_empty() {
        "nothing".to_string()
    } else {
        names.join(", ")
    };
    println!(
        "{} {} every {}",
        label,
        watched.bold(),
        format_interval(config.interval)
    );
}

/// Print a pushed event, as a table or as one JSON line
pub fn print_event(event: &MonitorEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&push_message(event))?);
        return Ok(());
    }

    match event {
        MonitorEvent::Snapshot(snapshot) => print_snapshot(snapshot),
        MonitorEvent::MonitoringStarted { config } => {
            print_config_line(&"Monitoring".green().bold().to_string(), config)
        }
        MonitorEvent::MonitoringStopped { .. } => {
            println!("{}", "Monitoring stopped".yellow().bold())
        }
        MonitorEvent::ConfigUpdated { config } => {
            print_config_line(&"Now watching".cyan().to_string(), config)
        }
    }
    Ok(())
}
