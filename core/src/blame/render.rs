use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use super::format::short_commit_info;
use super::parser::parse_blame;
use super::partition::{partition, Hunk};
use super::types::CommitEntry;
use crate::dates::RelativeDateFormatter;
use crate::error::BlameError;

/// Width of the right-aligned line number field.
const LINENO_WIDTH: usize = 4;

/// Full pipeline from raw porcelain text to the two-column blame view.
pub fn render_blame(raw: &str, dates: &dyn RelativeDateFormatter) -> Result<String, BlameError> {
    let normalized: String = raw.nfc().collect();
    let data = parse_blame(&normalized)?;

    let entries: HashMap<String, CommitEntry> = data
        .commits
        .iter()
        .map(|(hash, info)| (hash.clone(), short_commit_info(info, dates)))
        .collect();

    let hunks = partition(&data.lines);
    render_hunks(&hunks, &entries)
}

/// Lay out hunks next to their commit entries.
///
/// Each hunk becomes `max(entry lines, code lines)` rows of
/// `<entry line> | <lineno> <code>`; hunks are separated by a row of dashes.
/// Column widths come from the longest entry line and the longest code line
/// across the whole blame, so every hunk lines up.
pub fn render_hunks(
    hunks: &[Hunk<'_>],
    entries: &HashMap<String, CommitEntry>,
) -> Result<String, BlameError> {
    if hunks.iter().all(|hunk| hunk.is_empty()) {
        return Ok(String::new());
    }

    let left_pad = entries.values().map(CommitEntry::width).max().unwrap_or(0);
    let code_width = hunks
        .iter()
        .flat_map(|hunk| hunk.iter())
        .map(|line| line.contents.chars().count())
        .max()
        .unwrap_or(0);

    let spacer = format!(
        "{} | {}\n",
        "-".repeat(left_pad),
        "-".repeat(LINENO_WIDTH + 1 + code_width)
    );

    let blocks = hunks
        .iter()
        .filter(|hunk| !hunk.is_empty())
        .map(|hunk| {
            let hash = &hunk[0].commit_hash;
            let entry = entries
                .get(hash)
                .ok_or_else(|| BlameError::MissingCommit(hash.clone()))?;
            Ok(render_block(hunk, entry, left_pad))
        })
        .collect::<Result<Vec<String>, BlameError>>()?;

    Ok(blocks.join(&spacer))
}

fn render_block(hunk: Hunk<'_>, entry: &CommitEntry, left_pad: usize) -> String {
    let commit_lines = entry.lines();
    let total_rows = commit_lines.len().max(hunk.len());

    let mut output = String::new();
    for i in 0..total_rows {
        let left = commit_lines.get(i).map(String::as_str).unwrap_or("");
        let (lineno, right) = match hunk.get(i) {
            Some(line) => (line.final_lineno.to_string(), line.contents.as_str()),
            None => (String::new(), ""),
        };

        let row = format!(
            "{left:<left_pad$} | {lineno:>width$} {right}",
            width = LINENO_WIDTH
        );
        output.push_str(row.trim_end());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::fixtures::{sample_porcelain, HASH_A, HASH_B, NOW};
    use crate::blame::types::BlamedLine;
    use crate::dates::FuzzyDates;

    fn line(hash: &str, n: u32, contents: &str) -> BlamedLine {
        BlamedLine {
            contents: contents.to_string(),
            commit_hash: hash.to_string(),
            orig_lineno: n,
            final_lineno: n,
        }
    }

    fn entry(lines: &[&str]) -> CommitEntry {
        CommitEntry(lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_spacer_uses_global_widths() {
        let lines = vec![
            line(HASH_A, 1, &"a".repeat(8)),
            line(HASH_B, 2, &"b".repeat(30)),
        ];
        let mut entries = HashMap::new();
        entries.insert(HASH_A.to_string(), entry(&["x".repeat(10).as_str()]));
        entries.insert(HASH_B.to_string(), entry(&["y".repeat(25).as_str()]));

        let hunks = partition(&lines);
        let out = render_hunks(&hunks, &entries).unwrap();
        let rows: Vec<&str> = out.lines().collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].len(), 25 + 3 + (5 + 30));
        assert!(rows[1].chars().all(|c| c == '-' || c == ' ' || c == '|'));
        assert_eq!(rows[0], format!("{:<25} |    1 {}", "x".repeat(10), "a".repeat(8)));
        assert_eq!(rows[2], format!("{} |    2 {}", "y".repeat(25), "b".repeat(30)));
    }

    #[test]
    fn test_block_pads_shorter_side() {
        let lines = vec![line(HASH_A, 7, "only line")];
        let mut entries = HashMap::new();
        entries.insert(HASH_A.to_string(), entry(&["summary", "hash", "author"]));

        let hunks = partition(&lines);
        let out = render_hunks(&hunks, &entries).unwrap();
        assert_eq!(out, "summary |    7 only line\nhash    |\nauthor  |\n");
    }

    #[test]
    fn test_code_rows_beyond_entry_have_blank_left() {
        let lines = vec![line(HASH_A, 1, "one"), line(HASH_A, 2, "two")];
        let mut entries = HashMap::new();
        entries.insert(HASH_A.to_string(), entry(&["msg"]));

        let hunks = partition(&lines);
        let out = render_hunks(&hunks, &entries).unwrap();
        assert_eq!(out, "msg |    1 one\n    |    2 two\n");
    }

    #[test]
    fn test_empty_blame_renders_nothing() {
        let hunks = partition(&[]);
        assert_eq!(render_hunks(&hunks, &HashMap::new()).unwrap(), "");
    }

    #[test]
    fn test_missing_commit_entry() {
        let lines = vec![line(HASH_A, 1, "code")];
        let hunks = partition(&lines);
        assert!(matches!(
            render_hunks(&hunks, &HashMap::new()),
            Err(BlameError::MissingCommit(_))
        ));
    }

    #[test]
    fn test_render_sample() {
        let out = render_blame(&sample_porcelain(), &FuzzyDates::new(NOW)).unwrap();
        let rows: Vec<&str> = out.lines().collect();

        // A(2 code, 4 info) + spacer + B(1, 4) + spacer + A(1, 4) + spacer + uncommitted(1, 1)
        assert_eq!(rows.len(), 4 + 1 + 4 + 1 + 4 + 1 + 1);

        let width = "Print a much longer farewell message ...".len();
        assert_eq!(rows[0], format!("{:<width$} |    1 fn greet() {{", "Add greeting module"));
        assert_eq!(rows[1], format!("{:<width$} |    2     println!(\"hi\");", "1f2e3d4c5b6a"));
        assert_eq!(rows[2], format!("{:<width$} |", "Alice <alice@example.com>"));
        assert_eq!(rows[3], format!("{:<width$} |", "3 weeks ago"));
        assert_eq!(rows[4], format!("{} | {}", "-".repeat(width), "-".repeat(5 + 20)));
        assert_eq!(
            rows[5],
            "Print a much longer farewell message ... |    3     println!(\"bye\");"
        );
        assert_eq!(rows[8], format!("{:<width$} |", "2 weeks ago"));
        assert_eq!(rows[15], format!("{:<width$} |    5 // wip", "Not committed yet."));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_render_normalizes_to_nfc() {
        let raw = format!("{} 1 1 1\nsummary caf\u{0065}\u{0301}\n\tcaf\u{0065}\u{0301}\n", HASH_A);
        let out = render_blame(&raw, &FuzzyDates::new(NOW)).unwrap();
        assert!(out.contains("caf\u{00e9}"));
        assert!(!out.contains('\u{0301}'));
    }

    #[test]
    fn test_render_propagates_format_error() {
        let result = render_blame("garbage\n", &FuzzyDates::new(NOW));
        assert!(matches!(result, Err(BlameError::Format { .. })));
    }
}
