use std::io;
use thiserror::Error;

/// Error type for the process monitoring engine
#[derive(Error, Debug)]
pub enum PatrolError {
    /// Empty or missing process list on a call that replaces or extends the watch list
    #[error("{0}")]
    InvalidConfig(String),

    #[error("invalid interval")]
    InvalidInterval,

    /// `add` was given only names that are already watched
    #[error("process already monitored: {0}")]
    DuplicateEntry(String),

    #[error("process not monitored: {0}")]
    NotFound(String),

    #[error("not running")]
    NotRunning,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for the engine
pub type Result<T> = std::result::Result<T, PatrolError>;

impl PatrolError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PatrolError::InvalidConfig(msg.into())
    }

    pub fn duplicate_entry<S: Into<String>>(msg: S) -> Self {
        PatrolError::DuplicateEntry(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        PatrolError::NotFound(msg.into())
    }

    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        PatrolError::Runtime(msg.into())
    }

    /// True for errors caused by the caller's input or by calling an
    /// operation in the wrong state. These never change monitor state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PatrolError::InvalidConfig(_)
                | PatrolError::InvalidInterval
                | PatrolError::DuplicateEntry(_)
                | PatrolError::NotFound(_)
                | PatrolError::NotRunning
        )
    }

    /// HTTP status a transport should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            PatrolError::NotFound(_) => 404,
            e if e.is_validation() => 409,
            _ => 500,
        }
    }
}
