//! Error type shared by the parser, renderer and session.

use thiserror::Error;

/// All errors that can occur while producing or navigating a blame view.
#[derive(Error, Debug)]
pub enum BlameError {
    /// The porcelain output is corrupt at the given (1-based) input line.
    #[error("Malformed blame output at line {line}: {text:?}")]
    Format { line: usize, text: String },

    /// A hunk refers to a commit that has no formatted entry.
    #[error("No commit info for {0}")]
    MissingCommit(String),

    /// Navigation request that makes no sense relative to the current view.
    #[error("Invalid navigation: {0}")]
    InvalidNavigation(&'static str),

    /// The host failed to run a history query.
    #[error("History query failed: {0}")]
    Query(String),

    /// Unknown setting name or value passed by the host.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// Host-supplied JSON could not be decoded.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
