use anyhow::{Context, Result};
use clap::ArgMatches;
use std::sync::Arc;

use crate::api::ResultRow;
use crate::core::config::Config;
use crate::core::monitor::{Sampler, SysinfoProbe};
use crate::ui::print_sample;

/// Take one aggregated sample of a process name and print it
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .context("Name argument is required")?;
    let json = matches.get_flag("json");

    let config = Config::load()?;
    // A single refresh pair needs sysinfo's minimum gap to produce CPU figures
    let settle = config
        .monitor_options()
        .settle_delay
        .max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    let sampler = Sampler::with_settle(Arc::new(SysinfoProbe::new()), settle);
    let sample = sampler.sample(name);

    if json {
        println!("{}", serde_json::to_string_pretty(&ResultRow::from(&sample))?);
    } else {
        print_sample(&sample);
    }

    Ok(())
}
