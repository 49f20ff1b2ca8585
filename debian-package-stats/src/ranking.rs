// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Ordering packages by file count. */

use {crate::contents::FileCountTable, std::fmt::Display};

/// Default number of packages reported.
pub const DEFAULT_TOP_COUNT: usize = 10;

/// A package and the number of files it owns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RankedEntry {
    /// Name of the package.
    pub package: String,
    /// Number of files in the package.
    pub count: u64,
}

impl Display for RankedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} files)", self.package, self.count)
    }
}

/// Sort all packages in a table by descending file count.
///
/// The sort is stable: packages with equal counts retain the order in which they
/// were first seen by the table.
pub fn rank(table: &FileCountTable) -> Vec<RankedEntry> {
    let mut entries = table
        .iter()
        .map(|(package, count)| RankedEntry {
            package: package.to_string(),
            count,
        })
        .collect::<Vec<_>>();

    entries.sort_by(|a, b| b.count.cmp(&a.count));

    entries
}

/// Obtain the `limit` packages having the most files.
pub fn top(table: &FileCountTable, limit: usize) -> Vec<RankedEntry> {
    let mut entries = rank(table);
    entries.truncate(limit);

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(counts: &[(&str, u64)]) -> FileCountTable {
        let mut table = FileCountTable::default();

        for (package, count) in counts {
            for _ in 0..*count {
                table.increment(package);
            }
        }

        table
    }

    fn names(entries: &[RankedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.package.as_str()).collect()
    }

    #[test]
    fn descending_with_stable_ties() {
        let entries = rank(&table(&[("c", 3), ("a", 5), ("b", 5)]));

        assert_eq!(names(&entries), vec!["a", "b", "c"]);
        assert_eq!(
            entries.iter().map(|e| e.count).collect::<Vec<_>>(),
            vec![5, 5, 3]
        );

        let entries = rank(&table(&[("b", 5), ("a", 5), ("c", 3)]));
        assert_eq!(names(&entries), vec!["b", "a", "c"]);
    }

    #[test]
    fn top_truncates() {
        let counts = (1..=15)
            .map(|i| (format!("p{}", i), i as u64))
            .collect::<Vec<_>>();
        let counts = counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect::<Vec<_>>();

        let entries = top(&table(&counts), DEFAULT_TOP_COUNT);

        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].package, "p15");
        assert_eq!(entries[9].package, "p6");
        assert!(entries.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn top_of_small_table() {
        let entries = top(&table(&[("a", 1), ("b", 2)]), DEFAULT_TOP_COUNT);
        assert_eq!(names(&entries), vec!["b", "a"]);

        assert!(top(&FileCountTable::default(), DEFAULT_TOP_COUNT).is_empty());
    }

    #[test]
    fn display() {
        let entry = RankedEntry {
            package: "piglit".to_string(),
            count: 53007,
        };
        assert_eq!(format!("{}", entry), "piglit (53007 files)");
    }
}
