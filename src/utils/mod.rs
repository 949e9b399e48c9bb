// Shared helpers

pub mod time;

pub use time::{format_interval, time_stamp};
