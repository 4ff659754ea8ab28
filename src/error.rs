use thiserror::Error;

/// Errors raised while talking to screen or tailing its log files
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The screen binary could not be started at all
    #[error("failed to launch '{binary}': {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The named session is not in the current listing
    #[error("screen session not found: {0}")]
    SessionNotFound(String),

    /// More than one listing line carries the same name
    #[error("screen session '{name}' is ambiguous ({count} matches)")]
    AmbiguousSession { name: String, count: usize },

    /// A session line did not have the expected shape
    #[error("unexpected listing line {line:?}: {reason}")]
    Parse { line: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScreenError>;
