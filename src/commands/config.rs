use crate::core::config::Config;
use crate::core::monitor::split_names;
use crate::utils::format_interval;
use anyhow::{bail, Context, Result};
use colored::Colorize;

pub fn handle_config(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("path", _)) => path(),
        Some(("set-interval", sub_matches)) => set_interval(sub_matches),
        Some(("add", sub_matches)) => add(sub_matches),
        Some(("remove", sub_matches)) => remove(sub_matches),
        _ => {
            println!("Use 'pidpatrol config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "PID Patrol configuration".bold().bright_cyan());
    println!("{}", "=".repeat(40));
    println!("{:<18} {}", "Interval:".white(), format_interval(config.interval_secs).cyan());
    println!(
        "{:<18} {}",
        "Settle delay:".white(),
        format!("{}ms", config.settle_delay_ms).cyan()
    );
    println!(
        "{:<18} {}",
        "Subscriber buffer:".white(),
        config.subscriber_buffer.to_string().cyan()
    );

    if config.watch.is_empty() {
        println!("{:<18} {}", "Watch list:".white(), "empty".dimmed());
        println!();
        println!("{}", "To watch processes on startup, run:".white());
        println!("  {}", "pidpatrol config add python,chrome".cyan().bold());
    } else {
        println!("{}", "Watch list:".white());
        for name in &config.watch {
            println!("  {} {}", "•".dimmed(), name.bold());
        }
    }

    Ok(())
}

fn path() -> Result<()> {
    let path = Config::get_config_path()?;
    println!("{}", path.display().to_string().cyan());
    Ok(())
}

fn set_interval(matches: &clap::ArgMatches) -> Result<()> {
    let secs = *matches
        .get_one::<f64>("seconds")
        .context("Seconds argument is required")?;

    let mut config = Config::load()?;
    if !config.set_interval(secs) {
        bail!("Interval must be at least 1 second (got {})", secs);
    }
    config.save()?;

    println!(
        "{} {}",
        "✓ Interval set to".green(),
        format_interval(config.interval_secs).bold()
    );
    Ok(())
}

fn add(matches: &clap::ArgMatches) -> Result<()> {
    let names: Vec<String> = matches
        .get_many::<String>("names")
        .map(|values| values.flat_map(|v| split_names(v)).collect())
        .unwrap_or_default();
    if names.is_empty() {
        bail!("No process names given");
    }

    let mut config = Config::load()?;
    let added = config.add_watch(&names);
    if added == 0 {
        println!("{}", "All names are already on the watch list".yellow());
        return Ok(());
    }
    config.save()?;

    println!("{} {} name(s)", "✓ Added".green(), added);
    Ok(())
}

fn remove(matches: &clap::ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .context("Name argument is required")?;

    let mut config = Config::load()?;
    if !config.remove_watch(name) {
        bail!("'{}' is not on the watch list", name);
    }
    config.save()?;

    println!("{} {}", "✓ Removed".green(), name.bold());
    Ok(())
}
