use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::types::{BlameData, BlamedLine, CommitInfo, COMMIT_HASH_LENGTH};
use crate::error::BlameError;

/// `<40-hex sha> <orig_lineno> <final_lineno> [<num_lines>]`
fn record_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9a-f]{40}) (\d+) (\d+)( \d+)?").expect("valid regex"))
}

/// `<key> <value>`, value non-empty.
fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^ ]+) (.+)").expect("valid regex"))
}

/// Parse `git blame --porcelain` output.
///
/// The porcelain format looks like:
/// ```text
/// <40-char sha> <orig_line> <final_line> [<num_lines>]
/// author <name>
/// author-mail <<email>>
/// author-time <epoch>
/// ...
/// summary <text>
/// filename <path>
/// \t<line content>
/// ```
///
/// Header lines only follow the first record of each commit; later records for
/// the same commit carry just the sha line and the content line. Headers are
/// therefore merged into one `CommitInfo` per sha for the whole output.
///
/// Any record that does not start with a sha line, or that runs into the end of
/// the input before its content line, fails the whole parse.
pub fn parse_blame(text: &str) -> Result<BlameData, BlameError> {
    let mut lines: Vec<BlamedLine> = Vec::new();
    let mut commits: HashMap<String, CommitInfo> = HashMap::new();

    let mut input = text.lines().enumerate();

    while let Some((idx, line)) = input.next() {
        let caps = record_header_re()
            .captures(line)
            .ok_or_else(|| format_error(idx, line))?;

        let commit_hash = caps[1].to_string();
        let orig_lineno = parse_lineno(&caps[2]).ok_or_else(|| format_error(idx, line))?;
        let final_lineno = parse_lineno(&caps[3]).ok_or_else(|| format_error(idx, line))?;

        let info = commits.entry(commit_hash.clone()).or_default();
        info.set("short_hash", &commit_hash[..COMMIT_HASH_LENGTH]);
        info.set("long_hash", commit_hash.as_str());

        let mut last_idx = idx;
        let contents = loop {
            let Some((idx, next)) = input.next() else {
                return Err(BlameError::Format {
                    line: last_idx + 2,
                    text: "<end of input>".to_string(),
                });
            };
            last_idx = idx;

            if let Some(code) = next.strip_prefix('\t') {
                break code.to_string();
            }

            match key_value_re().captures(next) {
                Some(kv) => info.set(&kv[1], &kv[2]),
                // e.g. `boundary`, which has no value
                None => debug!(line = idx + 1, text = next, "Skipping blame header"),
            }
        };

        lines.push(BlamedLine {
            contents,
            commit_hash,
            orig_lineno,
            final_lineno,
        });
    }

    Ok(BlameData { lines, commits })
}

fn parse_lineno(digits: &str) -> Option<u32> {
    digits.parse().ok()
}

fn format_error(idx: usize, line: &str) -> BlameError {
    BlameError::Format {
        line: idx + 1,
        text: line.to_string(),
    }
}
