//! Commits that touched the blamed file, parsed from `git log` output.
//!
//! Serves both as the commit list for the picker and as the walker used for
//! older/newer navigation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::session::collab::HistoryWalker;
use crate::session::Position;

/// `--format` string whose output [`FileHistory::parse`] expects.
///
/// Fields are NUL (`\x00`) delimited and records end with `\x1e`:
///   0: %H  - full commit hash
///   1: %h  - abbreviated commit hash
///   2: %P  - parent hashes (space-separated)
///   3: %an - author name
///   4: %ae - author email
///   5: %at - author date (unix epoch)
///   6: %s  - subject
pub const LOG_FORMAT: &str = "%H%x00%h%x00%P%x00%an%x00%ae%x00%at%x00%s%x1e";

/// One commit in the file's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub sha: String,
    pub short_sha: String,
    pub parents: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_date: u64,
    pub subject: String,
}

/// History of a single file, newest commit first.
#[derive(Debug, Clone, Default)]
pub struct FileHistory {
    entries: Vec<LogEntry>,
    follow_renames: bool,
}

impl FileHistory {
    /// Arguments for the `git log` call whose output feeds [`FileHistory::parse`].
    pub fn log_args(file_path: &str, follow_renames: bool) -> Vec<String> {
        let mut args = vec!["log".to_string(), format!("--format={}", LOG_FORMAT)];
        if follow_renames {
            args.push("--follow".to_string());
        }
        args.push("--".to_string());
        args.push(file_path.to_string());
        args
    }

    /// Parse the output of the command built by [`FileHistory::log_args`].
    ///
    /// Records with too few fields are skipped.
    pub fn parse(raw: &[u8], follow_renames: bool) -> FileHistory {
        let input = String::from_utf8_lossy(raw);

        let entries = input
            .split('\x1e')
            .map(str::trim)
            .filter(|record| !record.is_empty())
            .filter_map(parse_record)
            .collect();

        FileHistory {
            entries,
            follow_renames,
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Index of a commit given by full or abbreviated hash. `HEAD` is the
    /// newest entry.
    pub fn position_of(&self, commit: &str) -> Option<usize> {
        if commit.is_empty() {
            return None;
        }
        if commit == "HEAD" {
            return (!self.entries.is_empty()).then_some(0);
        }
        self.entries
            .iter()
            .position(|e| e.sha.starts_with(commit))
    }
}

fn parse_record(record: &str) -> Option<LogEntry> {
    let fields: Vec<&str> = record.split('\x00').collect();
    if fields.len() < 7 {
        return None;
    }

    let sha = fields[0].trim().to_string();
    if sha.is_empty() {
        return None;
    }

    Some(LogEntry {
        sha,
        short_sha: fields[1].trim().to_string(),
        parents: fields[2].split_whitespace().map(str::to_string).collect(),
        author_name: fields[3].to_string(),
        author_email: fields[4].to_string(),
        author_date: fields[5].trim().parse().unwrap_or(0),
        subject: fields[6].to_string(),
    })
}

impl HistoryWalker for FileHistory {
    /// `None` stands for the working tree, whose older neighbor is the newest commit.
    ///
    /// The history is already parsed, so `follow_renames` cannot change the
    /// lookup; a mismatch with the parse mode is only logged.
    fn neighbor(&self, commit: Option<&str>, position: Position, follow_renames: bool) -> Option<String> {
        if follow_renames != self.follow_renames {
            warn!(
                requested = follow_renames,
                parsed = self.follow_renames,
                "File history was parsed with a different rename-following mode"
            );
        }

        let idx = match commit {
            None => {
                return match position {
                    Position::Older => self.entries.first().map(|e| e.sha.clone()),
                    Position::Newer => None,
                };
            }
            Some(commit) => self.position_of(commit)?,
        };

        let neighbor = match position {
            Position::Older => idx.checked_add(1)?,
            Position::Newer => idx.checked_sub(1)?,
        };
        self.entries.get(neighbor).map(|e| e.sha.clone())
    }
}
