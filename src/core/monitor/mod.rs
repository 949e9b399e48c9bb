//! Process monitoring engine.
//!
//! Tracks a watch list of process names, samples every name on each tick,
//! and pushes the resulting snapshot to subscribers.

mod engine;
pub mod events;
pub mod hub;
pub mod names;
mod poll;
pub mod probe;
pub mod sample;
pub mod sampler;
pub mod state;

pub use engine::{Monitor, MonitorOptions};
pub use events::{ConfigView, MonitorEvent, ProcessRef, Snapshot};
pub use hub::{BroadcastHub, SubscriberId, Subscription, TryRecvError};
pub use names::{merge_names, normalize, normalize_names, same_name, split_names};
pub use poll::sample_all;
pub use probe::{
    FakeProcess, MemoryProbe, ProcessEntry, ProcessProbe, ProcessReading, SysinfoProbe,
};
pub use sample::{ProcessSample, ProcessStatus};
pub use sampler::{aggregate, Sampler, DEFAULT_SETTLE_DELAY};
pub use state::{
    clamp_interval, IntervalValue, MonitorState, DEFAULT_INTERVAL_SECS, MAX_INTERVAL_SECS,
    MIN_INTERVAL_SECS,
};
