use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Hash git reports for lines that only exist in the working tree.
pub const NOT_COMMITTED_HASH: &str = "0000000000000000000000000000000000000000";

/// Number of hash characters shown in the commit column.
pub const COMMIT_HASH_LENGTH: usize = 12;

/// One line of the blamed file, attributed to the commit that introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlamedLine {
    pub contents: String,
    pub commit_hash: String,
    pub orig_lineno: u32,
    pub final_lineno: u32,
}

/// Header fields collected for one commit across the whole porcelain output.
///
/// Keys are the porcelain header names (`summary`, `author`, `author-mail`,
/// `author-time`, ...) plus `short_hash` and `long_hash`. Absent keys read as
/// the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitInfo {
    fields: HashMap<String, String>,
}

impl CommitInfo {
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Upsert a field; later values for the same key win.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn long_hash(&self) -> &str {
        self.get("long_hash")
    }

    pub fn short_hash(&self) -> &str {
        self.get("short_hash")
    }

    pub fn summary(&self) -> &str {
        self.get("summary")
    }
}

/// Display lines for one commit in the left column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitEntry(pub Vec<String>);

impl CommitEntry {
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    /// Width in characters of the longest display line.
    pub fn width(&self) -> usize {
        self.0.iter().map(|l| l.chars().count()).max().unwrap_or(0)
    }
}

/// Parsed porcelain output: lines in file order plus commit metadata by hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlameData {
    pub lines: Vec<BlamedLine>,
    pub commits: HashMap<String, CommitInfo>,
}
