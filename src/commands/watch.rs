//! Live monitoring command.
//!
//! Starts the engine on a dedicated runtime, prints every pushed event and
//! stops the monitor cleanly on Ctrl+C.

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::monitor::{split_names, IntervalValue, Monitor, SysinfoProbe};
use crate::ui::print_event;

/// Names from the command line, each argument split like free-text input
fn names_from_args(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("names")
        .map(|values| values.flat_map(|v| split_names(v)).collect())
        .unwrap_or_default()
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let json = matches.get_flag("json");
    let interval = matches.get_one::<f64>("interval").copied();

    let mut names = names_from_args(matches);
    if names.is_empty() {
        names = config.watch.clone();
    }
    if names.is_empty() {
        bail!("No process names given. Pass names or add them with 'pidpatrol config add <NAMES>'");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let monitor = Monitor::with_runtime(
        runtime.handle().clone(),
        config.monitor_options(),
        Arc::new(SysinfoProbe::new()),
    );
    let (mut subscription, _) = monitor.subscribe();

    let (cancel_tx, mut cancel_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    ctrlc::set_handler(move || {
        let _ = cancel_tx.send(());
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    if !json {
        println!("{}", "Press Ctrl+C to stop".dimmed());
    }

    monitor.start(Some(names), interval.map(IntervalValue::from));

    runtime.block_on(async {
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => print_event(&event, json)?,
                    None => {
                        log::warn!("Event stream closed, output fell too far behind");
                        break;
                    }
                },
                _ = cancel_rx.recv() => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    })?;

    if monitor.is_running() {
        monitor.stop().context("Failed to stop monitor")?;
    }

    while let Ok(event) = subscription.try_recv() {
        print_event(&event, json)?;
    }

    Ok(())
}
