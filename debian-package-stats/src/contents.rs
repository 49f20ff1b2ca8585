// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! `Contents` index file handling.

A `Contents` file maps paths to the packages that ship them. Each line is a path
followed by whitespace and a comma delimited list of qualified package names,
e.g. `usr/bin/foo    devel/piglit,libs/mesa`. Only the final `/` delimited
segment of a qualified name identifies the package.

Rather than retaining the full path to package mapping, the readers in this module
fold lines into a [FileCountTable] holding the number of paths owned by each
package. Memory use is therefore bounded by the number of distinct packages,
not by the size of the index.
*/

use {
    crate::error::{PackageStatsError, Result},
    futures::{AsyncBufRead, AsyncBufReadExt},
    log::trace,
    pin_project::pin_project,
    std::{collections::HashMap, io::BufRead},
};

/// Path value used by the archive for packages that contain no files.
pub const EMPTY_PACKAGE_PATH: &str = "EMPTY_PACKAGE";

/// A parsed line from a `Contents` file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentsLine<'a> {
    /// The path of the file.
    pub path: &'a str,
    /// The comma delimited list of qualified package names, unsplit.
    pub package_spec: &'a str,
}

impl<'a> ContentsLine<'a> {
    /// Parse a line into its path and package list.
    ///
    /// The package list is the final whitespace delimited field. Everything before
    /// it is the path, which may itself contain spaces. Returns [None] if the line
    /// does not have at least 2 fields.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let split = line.rfind(|c: char| c.is_ascii_whitespace())?;

        Some(Self {
            path: line[..split].trim_end(),
            package_spec: &line[split + 1..],
        })
    }

    /// Whether this is the `EMPTY_PACKAGE` placeholder entry.
    pub fn is_empty_package(&self) -> bool {
        self.path == EMPTY_PACKAGE_PATH
    }

    /// Whether this is the `FILE LOCATION` header terminating a legacy preamble.
    pub fn is_header(&self) -> bool {
        self.path == "FILE" && self.package_spec == "LOCATION"
    }

    /// Obtain an iterator of package names referenced by this line.
    ///
    /// Section qualifiers are stripped: `devel/piglit` yields `piglit`. Duplicate
    /// references are preserved.
    pub fn packages(&self) -> impl Iterator<Item = &'a str> {
        self.package_spec
            .split(',')
            .filter_map(|reference| reference.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// Number of files owned by each package.
///
/// Iteration order is the order in which packages were first seen.
#[derive(Clone, Debug, Default)]
pub struct FileCountTable {
    /// Mapping of package name to its offset in `counts`.
    index: HashMap<String, usize>,
    counts: Vec<(String, u64)>,
}

impl FileCountTable {
    /// Record that a package owns one more file.
    pub fn increment(&mut self, package: &str) {
        if let Some(offset) = self.index.get(package) {
            self.counts[*offset].1 += 1;
        } else {
            self.index.insert(package.to_string(), self.counts.len());
            self.counts.push((package.to_string(), 1));
        }
    }

    /// Parse a line of a `Contents` file and count the packages it references.
    ///
    /// `line_number` is only used for error reporting. Blank lines, the `FILE LOCATION`
    /// header and `EMPTY_PACKAGE` entries are accepted without counting anything.
    /// Lines with fewer than 2 fields are rejected.
    pub fn add_line(&mut self, line_number: usize, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        let entry = ContentsLine::parse(line).ok_or_else(|| PackageStatsError::Parse {
            line_number,
            line: line.trim_end_matches(&['\r', '\n'][..]).to_string(),
        })?;

        if entry.is_empty_package() || entry.is_header() {
            trace!("line {}: skipping {}", line_number, entry.path);
            return Ok(());
        }

        for package in entry.packages() {
            self.increment(package);
        }

        Ok(())
    }

    /// Obtain the file count of a package.
    pub fn get(&self, package: &str) -> Option<u64> {
        self.index.get(package).map(|offset| self.counts[*offset].1)
    }

    /// Obtain an iterator of packages and their file counts, in first seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// The number of distinct packages.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no packages have been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The total number of package to file associations counted.
    pub fn total_files(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }
}

/// Incrementally build a [FileCountTable] from a [BufRead].
#[derive(Clone, Debug)]
pub struct ContentsStatsReader<R> {
    reader: R,
    table: FileCountTable,
    line_number: usize,
}

impl<R: BufRead> ContentsStatsReader<R> {
    /// Create a new instance bound to a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            table: FileCountTable::default(),
            line_number: 0,
        }
    }

    /// Consumes the instance, returning the original reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Parse the entirety of the source reader.
    ///
    /// Returns the number of bytes read.
    pub fn read_all(&mut self) -> Result<usize> {
        let mut bytes_read = 0;

        loop {
            let read_size = self.read_line()?;
            if read_size == 0 {
                break;
            }

            bytes_read += read_size;
        }

        Ok(bytes_read)
    }

    /// Read and parse a single line from the reader.
    pub fn read_line(&mut self) -> Result<usize> {
        let mut line = vec![];
        let read_size = self.reader.read_until(b'\n', &mut line)?;

        if read_size != 0 {
            self.line_number += 1;
            self.table
                .add_line(self.line_number, &String::from_utf8_lossy(&line))?;
        }

        Ok(read_size)
    }

    /// Consume the instance and return the inner [FileCountTable] and the reader.
    pub fn consume(self) -> (FileCountTable, R) {
        (self.table, self.reader)
    }
}

/// Incrementally build a [FileCountTable] from an [AsyncBufRead].
#[pin_project]
pub struct ContentsStatsAsyncReader<R> {
    #[pin]
    reader: R,
    table: FileCountTable,
    line_number: usize,
}

impl<R> ContentsStatsAsyncReader<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Create a new instance bound to a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            table: FileCountTable::default(),
            line_number: 0,
        }
    }

    /// Consumes self, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Parse the entirety of the source reader.
    ///
    /// Returns the number of bytes read.
    pub async fn read_all(&mut self) -> Result<usize> {
        let mut bytes_read = 0;

        loop {
            let read_size = self.read_line().await?;
            if read_size == 0 {
                break;
            }

            bytes_read += read_size;
        }

        Ok(bytes_read)
    }

    /// Read and parse a single line from the reader.
    pub async fn read_line(&mut self) -> Result<usize> {
        let mut line = vec![];
        let read_size = self.reader.read_until(b'\n', &mut line).await?;

        if read_size != 0 {
            self.line_number += 1;
            self.table
                .add_line(self.line_number, &String::from_utf8_lossy(&line))?;
        }

        Ok(read_size)
    }

    /// The number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Consume the instance and return the inner [FileCountTable] and source reader.
    pub fn consume(self) -> (FileCountTable, R) {
        (self.table, self.reader)
    }
}
