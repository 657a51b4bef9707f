use super::types::{CommitEntry, CommitInfo, NOT_COMMITTED_HASH};
use crate::dates::RelativeDateFormatter;

const SUMMARY_MAX_CHARS: usize = 40;
const SUMMARY_KEEP_CHARS: usize = 36;

/// Reduce a commit's header fields to the lines shown in the left column:
/// summary, short hash, author with mail, and relative author date.
///
/// Working-tree lines get the single line `Not committed yet.`.
pub fn short_commit_info(commit: &CommitInfo, dates: &dyn RelativeDateFormatter) -> CommitEntry {
    if commit.long_hash() == NOT_COMMITTED_HASH {
        return CommitEntry(vec!["Not committed yet.".to_string()]);
    }

    let author_info = format!("{} {}", commit.get("author"), commit.get("author-mail"));
    let author_time = commit.get("author-time");
    let time_stamp = if author_time.is_empty() {
        String::new()
    } else {
        dates.relative(author_time)
    };

    CommitEntry(vec![
        truncate_summary(commit.summary()),
        commit.short_hash().to_string(),
        author_info,
        time_stamp,
    ])
}

/// Summaries longer than 40 characters keep their first 36 plus `" ..."`.
pub fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() > SUMMARY_MAX_CHARS {
        let kept: String = summary.chars().take(SUMMARY_KEEP_CHARS).collect();
        format!("{} ...", kept)
    } else {
        summary.to_string()
    }
}
