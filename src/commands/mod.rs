// Command handlers module
pub mod config;
pub mod sample;
pub mod watch;

// Re-exports for cleaner imports
pub use sample::execute as sample;
pub use watch::execute as watch;
