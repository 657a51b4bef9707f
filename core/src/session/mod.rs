//! Per-view blame state and the navigation between blamed commits.
//!
//! A [`BlameSession`] lives as long as its blame view. It remembers which
//! commit is being blamed, the display flags, the line the cursor should land
//! on after the next render, and the last rendered text (which the cursor
//! helpers read positions from).
//!
//! Refreshes are two-phase so the git query can run elsewhere:
//! [`BlameSession::begin_refresh`] stamps a [`BlameRequest`], and
//! [`BlameSession::complete_refresh`] applies its output only if nothing has
//! changed the session in the meantime.

pub mod collab;
pub mod request;

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::blame::{find_lineno, find_selected_commit_hash, locate_line, render_blame};
use crate::config::BlameConfig;
use crate::error::BlameError;
use collab::{HistoryQuery, HistoryWalker, LineCorrespondence, RelativeDateFormatter};
pub use request::BlameRequest;

/// Direction of a step through the file's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Older,
    Newer,
}

impl FromStr for Position {
    type Err = BlameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "older" => Ok(Position::Older),
            "newer" => Ok(Position::Newer),
            other => Err(BlameError::InvalidSetting(format!("unknown position '{}'", other))),
        }
    }
}

/// How far `git blame` looks for moved or copied lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveCopyScope {
    /// Within the same file (`-M`).
    File,
    /// Across files changed in the same commit (`-C`).
    Commit,
    /// Across all commits (`-CCC`).
    AllCommits,
}

impl MoveCopyScope {
    pub fn flag(self) -> &'static str {
        match self {
            MoveCopyScope::File => "-M",
            MoveCopyScope::Commit => "-C",
            MoveCopyScope::AllCommits => "-CCC",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MoveCopyScope::File => "file",
            MoveCopyScope::Commit => "commit",
            MoveCopyScope::AllCommits => "all_commits",
        }
    }
}

impl FromStr for MoveCopyScope {
    type Err = BlameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(MoveCopyScope::File),
            "commit" => Ok(MoveCopyScope::Commit),
            "all_commits" => Ok(MoveCopyScope::AllCommits),
            other => Err(BlameError::InvalidSetting(format!(
                "unknown move/copy scope '{}'",
                other
            ))),
        }
    }
}

/// A view option the user can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    IgnoreWhitespace,
    /// Select this scope, or switch detection off if it is already selected.
    DetectMoveOrCopyWithin(MoveCopyScope),
}

impl Setting {
    /// Parse a setting name and optional value as sent by the host.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Setting, BlameError> {
        match (name, value) {
            ("ignore_whitespace", _) => Ok(Setting::IgnoreWhitespace),
            ("detect_move_or_copy_within", Some(scope)) => {
                Ok(Setting::DetectMoveOrCopyWithin(scope.parse()?))
            }
            ("detect_move_or_copy_within", None) => Err(BlameError::InvalidSetting(
                "detect_move_or_copy_within needs a scope".to_string(),
            )),
            (other, _) => Err(BlameError::InvalidSetting(format!("unknown setting '{}'", other))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Setting::IgnoreWhitespace => "ignore_whitespace",
            Setting::DetectMoveOrCopyWithin(_) => "detect_move_or_copy_within",
        }
    }
}

/// Whether a session operation requires the view to be re-blamed.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Unchanged,
    Refresh,
}

/// Result of applying a blame query to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The view text changed.
    Rendered {
        content: String,
        title: String,
        /// Row to put the cursor on, when a pending line was found in the new text.
        cursor_row: Option<usize>,
        /// The view had no content before.
        first_render: bool,
    },
    /// Same text as already shown. The title still follows the active commit,
    /// which may have changed without changing the blame.
    Unchanged { title: String },
    /// The session moved on since the request was issued.
    Discarded,
}

/// Where "show file at commit" should open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAtCommit {
    pub commit_hash: String,
    pub file_path: String,
    pub lineno: u32,
    pub syntax: Option<String>,
}

/// What the host knows when a blame view opens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenParams {
    pub repo_path: String,
    pub file_path: String,
    /// Commit to blame; `None` blames the working tree.
    pub commit_hash: Option<String>,
    /// Syntax of the view the blame was opened from.
    pub original_syntax: Option<String>,
    /// 1-based cursor line in the file being blamed.
    pub cursor_line: u32,
}

/// State of one blame view.
#[derive(Debug, Clone)]
pub struct BlameSession {
    repo_path: String,
    file_path: String,
    commit_hash: Option<String>,
    pending_lineno: Option<u32>,
    ignore_whitespace: bool,
    detect_move_or_copy: Option<MoveCopyScope>,
    original_syntax: Option<String>,
    follow_renames: bool,
    content: String,
    generation: u64,
}

impl BlameSession {
    /// Start a session; the cursor line is mapped from the working tree onto
    /// the commit being blamed.
    pub fn open(
        params: OpenParams,
        config: &BlameConfig,
        lines: &dyn LineCorrespondence,
    ) -> BlameSession {
        let pending_lineno = match &params.commit_hash {
            Some(commit) => lines.matching_line(None, commit, params.cursor_line),
            None => params.cursor_line.max(1),
        };

        info!(
            file = %params.file_path,
            commit = ?params.commit_hash,
            line = pending_lineno,
            "Opening blame session"
        );

        BlameSession {
            repo_path: params.repo_path,
            file_path: params.file_path,
            commit_hash: params.commit_hash,
            pending_lineno: Some(pending_lineno),
            ignore_whitespace: false,
            detect_move_or_copy: None,
            original_syntax: params.original_syntax,
            follow_renames: config.follow_renames,
            content: String::new(),
            generation: 0,
        }
    }

    pub fn commit_hash(&self) -> Option<&str> {
        self.commit_hash.as_deref()
    }

    pub fn pending_lineno(&self) -> Option<u32> {
        self.pending_lineno
    }

    pub fn ignore_whitespace(&self) -> bool {
        self.ignore_whitespace
    }

    pub fn detect_move_or_copy(&self) -> Option<MoveCopyScope> {
        self.detect_move_or_copy
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// `BLAME: <path relative to the repo>[ at <short hash>]`.
    pub fn title(&self) -> String {
        let path = if self.file_path.is_empty() {
            "unknown".to_string()
        } else {
            Path::new(&self.file_path)
                .strip_prefix(&self.repo_path)
                .unwrap_or_else(|_| Path::new(&self.file_path))
                .to_string_lossy()
                .into_owned()
        };
        match &self.commit_hash {
            Some(commit) => format!("BLAME: {} at {}", path, short(commit, 7)),
            None => format!("BLAME: {}", path),
        }
    }

    /// Issue a query for the current state. Any earlier in-flight request
    /// becomes stale.
    pub fn begin_refresh(&mut self) -> BlameRequest {
        self.generation += 1;
        BlameRequest {
            generation: self.generation,
            file_path: self.file_path.clone(),
            commit_hash: self.commit_hash.clone(),
            ignore_whitespace: self.ignore_whitespace,
            detect_move_or_copy: self.detect_move_or_copy,
            follow_renames: self.follow_renames,
        }
    }

    /// Render the output of `request` and make it the view content.
    ///
    /// On error the session is left untouched.
    pub fn complete_refresh(
        &mut self,
        request: &BlameRequest,
        raw: &str,
        dates: &dyn RelativeDateFormatter,
    ) -> Result<RefreshOutcome, BlameError> {
        if request.generation != self.generation || request.commit_hash != self.commit_hash {
            debug!(
                request = request.generation,
                current = self.generation,
                "Discarding stale blame result"
            );
            return Ok(RefreshOutcome::Discarded);
        }

        let content = render_blame(raw, dates)?;
        if content == self.content {
            return Ok(RefreshOutcome::Unchanged {
                title: self.title(),
            });
        }

        let first_render = self.content.is_empty();
        let cursor_row = self
            .pending_lineno
            .take()
            .and_then(|lineno| locate_line(&content, lineno));
        self.content = content.clone();

        Ok(RefreshOutcome::Rendered {
            content,
            title: self.title(),
            cursor_row,
            first_render,
        })
    }

    /// Query and render in one go.
    pub fn refresh(
        &mut self,
        query: &dyn HistoryQuery,
        dates: &dyn RelativeDateFormatter,
    ) -> Result<RefreshOutcome, BlameError> {
        let request = self.begin_refresh();
        let raw = query.blame(&request)?;
        self.complete_refresh(&request, &raw, dates)
    }

    /// Blame the commit before or after the current one, or (with `selected`)
    /// the commit before the one that introduced the hunk under the cursor.
    ///
    /// The cursor line is carried over to the new commit.
    pub fn blame_neighbor(
        &mut self,
        position: Position,
        selected: bool,
        cursor_row: usize,
        walker: &dyn HistoryWalker,
        lines: &dyn LineCorrespondence,
    ) -> Result<Transition, BlameError> {
        if position == Position::Newer && selected {
            return Err(BlameError::InvalidNavigation(
                "blaming a commit after the selected commit is ambiguous",
            ));
        }

        let reference = if selected {
            match find_selected_commit_hash(&self.content, cursor_row) {
                Some(hash) => Some(hash),
                None => return Ok(Transition::Unchanged),
            }
        } else {
            self.commit_hash.clone()
        };

        let Some(neighbor) = walker.neighbor(reference.as_deref(), position, self.follow_renames)
        else {
            info!(commit = ?reference, ?position, "No neighboring commit");
            return Ok(Transition::Unchanged);
        };

        if self.commit_hash.as_deref() == Some(neighbor.as_str()) {
            return Ok(Transition::Unchanged);
        }

        let lineno = lines.matching_line(
            reference.as_deref(),
            &neighbor,
            find_lineno(&self.content, cursor_row),
        );

        debug!(from = ?reference, to = %neighbor, line = lineno, "Blaming neighbor commit");
        self.commit_hash = Some(neighbor);
        self.pending_lineno = Some(lineno);
        self.generation += 1;
        Ok(Transition::Refresh)
    }

    /// Result of the commit picker. Cancelling (`None`) keeps the current commit.
    ///
    /// The cursor line is not remapped here.
    pub fn pick_commit(&mut self, choice: Option<String>) -> Transition {
        match choice {
            None => Transition::Unchanged,
            Some(commit) => {
                self.commit_hash = Some(commit);
                self.generation += 1;
                Transition::Refresh
            }
        }
    }

    /// Flip a view option and remember the cursor line for the re-render.
    ///
    /// Returns a status message like `ignore_whitespace is now true`.
    pub fn toggle_setting(&mut self, setting: Setting, cursor_row: usize) -> String {
        let value = match setting {
            Setting::IgnoreWhitespace => {
                self.ignore_whitespace = !self.ignore_whitespace;
                self.ignore_whitespace.to_string()
            }
            Setting::DetectMoveOrCopyWithin(scope) => {
                self.detect_move_or_copy = if self.detect_move_or_copy == Some(scope) {
                    None
                } else {
                    Some(scope)
                };
                self.detect_move_or_copy
                    .map_or_else(|| "off".to_string(), |s| s.name().to_string())
            }
        };

        self.pending_lineno = Some(find_lineno(&self.content, cursor_row));
        self.generation += 1;
        format!("{} is now {}", setting.name(), value)
    }

    /// Commit and line for opening the file itself: the blamed commit, or with
    /// `from_line` the commit of the hunk under the cursor.
    pub fn show_file_at_commit(
        &self,
        from_line: bool,
        cursor_row: usize,
        lines: &dyn LineCorrespondence,
    ) -> FileAtCommit {
        let lineno = find_lineno(&self.content, cursor_row);

        let (commit_hash, lineno) = if from_line {
            let target = find_selected_commit_hash(&self.content, cursor_row)
                .unwrap_or_else(|| "HEAD".to_string());
            let lineno = lines.matching_line(self.commit_hash.as_deref(), &target, lineno);
            (target, lineno)
        } else {
            let active = self.commit_hash.clone().unwrap_or_else(|| "HEAD".to_string());
            (active, lineno)
        };

        FileAtCommit {
            commit_hash,
            file_path: self.file_path.clone(),
            lineno,
            syntax: self.original_syntax.clone(),
        }
    }
}

fn short(hash: &str, len: usize) -> &str {
    hash.get(..len).unwrap_or(hash)
}
