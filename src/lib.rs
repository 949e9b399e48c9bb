// PID Patrol Library - Public API

// Re-export error types
pub mod error;
pub use error::{PatrolError, Result};

// Module declarations
pub mod api;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use api::Api;
pub use core::config::Config;
pub use core::monitor::{
    Monitor, MonitorEvent, MonitorOptions, ProcessSample, Snapshot, SysinfoProbe,
};

// Initialize logging; RUST_LOG overrides the default `info` level
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
