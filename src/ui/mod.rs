// Terminal rendering for monitor output

pub mod formatters;
pub mod snapshot;

// Re-export commonly used items for cleaner imports
pub use formatters::{colorize_cpu, format_cpu, format_memory, format_pids, format_status};
pub use snapshot::{print_event, print_sample, print_snapshot};
