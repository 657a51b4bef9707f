use super::types::BlamedLine;

/// A maximal run of consecutive lines blamed on the same commit.
pub type Hunk<'a> = &'a [BlamedLine];

/// Split blamed lines into hunks, starting a new one whenever the commit changes.
///
/// An empty input still yields a single empty hunk.
pub fn partition(lines: &[BlamedLine]) -> Vec<Hunk<'_>> {
    if lines.is_empty() {
        return vec![lines];
    }
    lines
        .chunk_by(|prev, line| prev.commit_hash == line.commit_hash)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::fixtures::{HASH_A, HASH_B};
    use proptest::prelude::*;

    fn line(hash: &str, n: u32) -> BlamedLine {
        BlamedLine {
            contents: format!("line {}", n),
            commit_hash: hash.to_string(),
            orig_lineno: n,
            final_lineno: n,
        }
    }

    #[test]
    fn test_partition_empty_yields_one_empty_hunk() {
        let hunks = partition(&[]);
        assert_eq!(hunks.len(), 1);
        assert!(hunks[0].is_empty());
    }

    #[test]
    fn test_partition_splits_on_commit_change() {
        let lines = vec![
            line(HASH_A, 1),
            line(HASH_A, 2),
            line(HASH_B, 3),
            line(HASH_A, 4),
        ];
        let hunks = partition(&lines);
        assert_eq!(hunks.len(), 3);
        assert_eq!(hunks[0].len(), 2);
        assert_eq!(hunks[1][0].final_lineno, 3);
        assert_eq!(hunks[2][0].commit_hash, HASH_A);
    }

    #[test]
    fn test_partition_single_commit() {
        let lines = vec![line(HASH_B, 1), line(HASH_B, 2)];
        let hunks = partition(&lines);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].len(), 2);
    }

    proptest! {
        /// Adjacent hunks never share a commit, and hunks concatenate back to the input.
        #[test]
        fn partition_is_lossless_and_maximal(picks in proptest::collection::vec(0usize..3, 0..60)) {
            let hashes = ["a".repeat(40), "b".repeat(40), "c".repeat(40)];
            let lines: Vec<BlamedLine> = picks
                .iter()
                .enumerate()
                .map(|(i, &p)| line(&hashes[p], i as u32 + 1))
                .collect();

            let hunks = partition(&lines);
            prop_assert!(!hunks.is_empty());

            for pair in hunks.windows(2) {
                prop_assert!(!pair[0].is_empty() && !pair[1].is_empty());
                prop_assert_ne!(&pair[0][0].commit_hash, &pair[1][0].commit_hash);
            }
            for hunk in &hunks {
                prop_assert!(hunk.iter().all(|l| l.commit_hash == hunk[0].commit_hash));
            }

            let rejoined: Vec<BlamedLine> = hunks.iter().flat_map(|h| h.iter().cloned()).collect();
            prop_assert_eq!(rejoined, lines);
        }
    }
}
