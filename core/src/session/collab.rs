//! Services the host provides to a blame session.

use super::request::BlameRequest;
use super::Position;
use crate::error::BlameError;

pub use crate::dates::RelativeDateFormatter;

/// Runs `git blame --porcelain` for a request and returns its stdout.
///
/// When `request.follow_renames` is set and a commit is given, the
/// implementation is expected to blame the file under the name it had at
/// that commit.
pub trait HistoryQuery {
    fn blame(&self, request: &BlameRequest) -> Result<String, BlameError>;
}

/// Finds the commit before or after another one in the file's history.
///
/// `commit` is `None` for the working tree. Returns `None` at the ends of
/// history.
pub trait HistoryWalker {
    fn neighbor(&self, commit: Option<&str>, position: Position, follow_renames: bool) -> Option<String>;
}

/// Maps a line number in the file at `old` to the best matching line in the
/// file at `new`.
pub trait LineCorrespondence {
    fn matching_line(&self, old: Option<&str>, new: &str, line: u32) -> u32;
}

/// Correspondence that keeps the line number as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameLine;

impl LineCorrespondence for SameLine {
    fn matching_line(&self, _old: Option<&str>, _new: &str, line: u32) -> u32 {
        line.max(1)
    }
}
