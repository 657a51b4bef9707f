use serde::{Deserialize, Serialize};

use super::MoveCopyScope;

/// One blame query, stamped with the session generation it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameRequest {
    pub generation: u64,
    pub file_path: String,
    pub commit_hash: Option<String>,
    pub ignore_whitespace: bool,
    pub detect_move_or_copy: Option<MoveCopyScope>,
    pub follow_renames: bool,
}

impl BlameRequest {
    /// `git` arguments: `blame -p [-w] [-M|-C|-CCC] [<commit>] -- <file>`.
    pub fn git_args(&self) -> Vec<String> {
        let mut args = vec!["blame".to_string(), "-p".to_string()];
        if self.ignore_whitespace {
            args.push("-w".to_string());
        }
        if let Some(scope) = self.detect_move_or_copy {
            args.push(scope.flag().to_string());
        }
        if let Some(commit) = &self.commit_hash {
            args.push(commit.clone());
        }
        args.push("--".to_string());
        args.push(self.file_path.clone());
        args
    }
}
