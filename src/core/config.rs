use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::monitor::hub::DEFAULT_SUBSCRIBER_BUFFER;
use crate::core::monitor::{
    clamp_interval, merge_names, normalize, same_name, MonitorOptions, DEFAULT_INTERVAL_SECS,
    DEFAULT_SETTLE_DELAY, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Polling interval in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: f64,
    /// Delay between CPU priming and reading, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Events queued per subscriber before it is dropped as too slow
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
    /// Process names watched at startup
    #[serde(default)]
    pub watch: Vec<String>,
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL_SECS
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}

fn default_subscriber_buffer() -> usize {
    DEFAULT_SUBSCRIBER_BUFFER
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            settle_delay_ms: default_settle_delay_ms(),
            subscriber_buffer: default_subscriber_buffer(),
            watch: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path. A missing, empty or unreadable file gives
    /// the default configuration.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        let config = serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config file {:?}: {}", config_path, e);
            Config::default()
        });

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("pidpatrol").join("config.json"))
    }

    /// Set the polling interval; values outside one second to one day are
    /// refused.
    pub fn set_interval(&mut self, secs: f64) -> bool {
        if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
            return false;
        }
        self.interval_secs = secs;
        true
    }

    /// Add names to the startup watch list. Returns how many were new.
    pub fn add_watch<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.watch.len();
        let incoming = normalize(names);
        self.watch = merge_names(&self.watch, &incoming);
        self.watch.len().saturating_sub(before)
    }

    /// Remove a name from the startup watch list, ignoring case.
    pub fn remove_watch(&mut self, name: &str) -> bool {
        let before = self.watch.len();
        self.watch.retain(|n| !same_name(n, name));
        self.watch.len() != before
    }

    /// Engine options derived from this config, with out-of-range values
    /// pulled back into range.
    pub fn monitor_options(&self) -> MonitorOptions {
        let interval_secs = if self.interval_secs.is_finite() {
            clamp_interval(self.interval_secs)
        } else {
            DEFAULT_INTERVAL_SECS
        };

        MonitorOptions {
            interval_secs,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            subscriber_buffer: self.subscriber_buffer.max(1),
            watch: normalize(&self.watch),
        }
    }
}
