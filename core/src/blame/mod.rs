pub mod types;
pub mod parser;
pub mod partition;
pub mod format;
pub mod render;
pub mod cursor;

pub use types::*;
pub use parser::parse_blame;
pub use partition::{partition, Hunk};
pub use format::short_commit_info;
pub use render::{render_blame, render_hunks};
pub use cursor::{find_lineno, find_selected_commit_hash, locate_line};

#[cfg(test)]
pub(crate) mod fixtures {
    pub const HASH_A: &str = "1f2e3d4c5b6a79881f2e3d4c5b6a79881f2e3d4c";
    pub const HASH_B: &str = "9a8b7c6d5e4f30219a8b7c6d5e4f30219a8b7c6d";
    pub const HASH_Z: &str = "0000000000000000000000000000000000000000";

    /// Three weeks after commit A.
    pub const NOW: u64 = 1_700_000_000 + 3 * 604_800;

    /// Five lines: A, A, B, A, and one uncommitted line.
    pub fn sample_porcelain() -> String {
        format!(
            "{a} 1 1 2\n\
             author Alice\n\
             author-mail <alice@example.com>\n\
             author-time 1700000000\n\
             author-tz +0000\n\
             committer Alice\n\
             committer-mail <alice@example.com>\n\
             committer-time 1700000000\n\
             committer-tz +0000\n\
             summary Add greeting module\n\
             boundary\n\
             filename src/greet.rs\n\
             \tfn greet() {{\n\
             {a} 2 2\n\
             \t    println!(\"hi\");\n\
             {b} 5 3 1\n\
             author Bob\n\
             author-mail <bob@example.com>\n\
             author-time 1700086400\n\
             author-tz +0100\n\
             committer Bob\n\
             committer-mail <bob@example.com>\n\
             committer-time 1700086400\n\
             committer-tz +0100\n\
             summary Print a much longer farewell message than before\n\
             previous {a} src/greet.rs\n\
             filename src/greet.rs\n\
             \t    println!(\"bye\");\n\
             {a} 3 4 1\n\
             \t}}\n\
             {z} 4 5 1\n\
             author Not Committed Yet\n\
             author-mail <not.committed.yet>\n\
             author-time 1700090000\n\
             author-tz +0000\n\
             committer Not Committed Yet\n\
             committer-mail <not.committed.yet>\n\
             committer-time 1700090000\n\
             committer-tz +0000\n\
             summary Version of src/greet.rs from src/greet.rs\n\
             previous {b} src/greet.rs\n\
             filename src/greet.rs\n\
             \t// wip\n",
            a = HASH_A,
            b = HASH_B,
            z = HASH_Z,
        )
    }
}
