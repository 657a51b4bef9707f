//! Read positions back out of a rendered blame view.
//!
//! Rows are 0-based indices into `content.lines()`.

use std::sync::OnceLock;

use regex::Regex;

use super::types::COMMIT_HASH_LENGTH;

/// The line number field right after the column separator.
fn lineno_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ +(\d+)(?: |$)").expect("valid regex"))
}

/// The dashed row between two hunks.
fn spacer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-+ \| -+$").expect("valid regex"))
}

/// Char offsets of every ` |` followed by a space or the end of the row.
fn separator_candidates(row: &str) -> Vec<usize> {
    let chars: Vec<char> = row.chars().collect();
    (0..chars.len().saturating_sub(1))
        .filter(|&i| {
            chars[i] == ' ' && chars[i + 1] == '|' && chars.get(i + 2).map_or(true, |&c| c == ' ')
        })
        .collect()
}

/// Char offset of the column separator.
///
/// The commit column is padded to the same width on every row, so the real
/// separator is the leftmost offset shared by all rows. Pipes inside a summary
/// or inside the code only show up on some rows.
fn separator_column(rows: &[&str]) -> Option<usize> {
    let mut shared: Option<Vec<usize>> = None;
    for row in rows {
        let found = separator_candidates(row);
        shared = Some(match shared {
            None => found,
            Some(prev) => prev.into_iter().filter(|c| found.contains(c)).collect(),
        });
    }
    shared?.into_iter().min()
}

/// Line number printed on `row`, given the separator column.
fn lineno_at(row: &str, column: usize) -> Option<u32> {
    let (start, _) = row.char_indices().nth(column)?;
    // skip " |"
    let field = row.get(start + 2..)?;
    lineno_field_re()
        .captures(field)
        .and_then(|caps| caps[1].parse().ok())
}

/// Line number shown on `row`, or on the closest numbered row above it.
/// Falls back to 1.
pub fn find_lineno(content: &str, row: usize) -> u32 {
    let rows: Vec<&str> = content.lines().collect();
    let Some(column) = separator_column(&rows) else {
        return 1;
    };
    let last = row.min(rows.len().saturating_sub(1));
    rows[..=last]
        .iter()
        .rev()
        .find_map(|line| lineno_at(line, column))
        .unwrap_or(1)
}

/// Short hash of the hunk that contains `row`.
///
/// The hash is printed on the second row of every hunk. `None` when that row
/// holds no hash, as for uncommitted lines.
pub fn find_selected_commit_hash(content: &str, row: usize) -> Option<String> {
    let rows: Vec<&str> = content.lines().collect();
    let last = row.min(rows.len().checked_sub(1)?);

    let hash_row = rows[..=last]
        .iter()
        .rposition(|line| spacer_re().is_match(line))
        .map(|spacer| spacer + 2)
        .unwrap_or(1);

    let candidate: String = rows
        .get(hash_row)?
        .chars()
        .take(COMMIT_HASH_LENGTH)
        .collect();
    let candidate = candidate.trim();

    if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Row whose line number field shows `lineno`.
pub fn locate_line(content: &str, lineno: u32) -> Option<usize> {
    let rows: Vec<&str> = content.lines().collect();
    let column = separator_column(&rows)?;
    rows.iter()
        .position(|line| lineno_at(line, column) == Some(lineno))
}
