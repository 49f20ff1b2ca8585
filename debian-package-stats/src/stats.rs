// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Package file count statistics for a mirror directory. */

use {
    crate::{
        catalog::{ArchitectureCatalog, ContentsVariant},
        contents::{ContentsStatsAsyncReader, FileCountTable},
        error::{PackageStatsError, Result},
        io::{classify_read_error, DataResolver},
        ranking::{top, RankedEntry, DEFAULT_TOP_COUNT},
        repository::resolver_from_location,
    },
    log::{debug, info},
};

/// Default mirror directory to read `Contents` indices from.
pub const DEFAULT_MIRROR_URL: &str = "http://ftp.uk.debian.org/debian/dists/stable/main/";

/// A session against a single mirror directory.
///
/// The directory listing is fetched and parsed once, when the instance is
/// constructed. Every statistics request then performs a fresh fetch of the
/// relevant `Contents` index. Nothing is cached between requests.
pub struct PackageStats {
    resolver: Box<dyn DataResolver + Send>,
    catalog: ArchitectureCatalog,
}

impl PackageStats {
    /// Construct an instance from a [DataResolver] bound to a mirror directory.
    pub async fn new(resolver: Box<dyn DataResolver + Send>) -> Result<Self> {
        let catalog = ArchitectureCatalog::resolve(resolver.as_ref()).await?;

        Ok(Self { resolver, catalog })
    }

    /// Construct an instance from a URL or filesystem path.
    ///
    /// See [resolver_from_location()] for how the value is interpreted.
    pub async fn from_location(location: &str) -> Result<Self> {
        info!("reading mirror directory {}", location);
        Self::new(resolver_from_location(location)?).await
    }

    /// The catalog of `Contents` indices discovered in the mirror directory.
    pub fn catalog(&self) -> &ArchitectureCatalog {
        &self.catalog
    }

    /// Obtain the recognized architecture names, in sorted order.
    pub fn get_archs(&self) -> Vec<&str> {
        self.catalog.architectures().collect()
    }

    /// Ensure an architecture is recognized.
    pub fn is_valid_arch(&self, arch: &str) -> Result<()> {
        if self.catalog.contains(arch) {
            Ok(())
        } else {
            Err(PackageStatsError::UnknownArchitecture(arch.to_string()))
        }
    }

    /// Count files per package in an architecture's `Contents` index.
    ///
    /// The index is streamed and decompressed line by line. The underlying
    /// connection or file handle is released before this returns, on success
    /// or failure.
    pub async fn package_counts(
        &self,
        arch: &str,
        variant: ContentsVariant,
    ) -> Result<FileCountTable> {
        self.is_valid_arch(arch)?;

        let index = self
            .catalog
            .get(arch)
            .and_then(|files| files.get(variant))
            .ok_or_else(|| PackageStatsError::ContentsIndexMissing(arch.to_string(), variant))?;

        info!("fetching {}", index.filename);
        let reader = self
            .resolver
            .get_path_decoded(&index.filename, index.compression)
            .await?;

        let mut reader = ContentsStatsAsyncReader::new(reader);
        let bytes_read = reader.read_all().await.map_err(|e| match e {
            PackageStatsError::Io(e) => classify_read_error(&index.filename, e),
            e => e,
        })?;

        debug!(
            "read {} lines ({} bytes) from {}",
            reader.lines_read(),
            bytes_read,
            index.filename
        );

        let (table, _) = reader.consume();

        info!(
            "{} packages own {} files in {}",
            table.len(),
            table.total_files(),
            index.filename
        );

        Ok(table)
    }

    /// Obtain the `limit` packages with the most files for an architecture.
    pub async fn get_package_stats_variant(
        &self,
        arch: &str,
        variant: ContentsVariant,
        limit: usize,
    ) -> Result<Vec<RankedEntry>> {
        let table = self.package_counts(arch, variant).await?;

        Ok(top(&table, limit))
    }

    /// Obtain the 10 packages with the most files for an architecture.
    ///
    /// Packages are ordered by descending file count. Packages with equal counts
    /// are ordered by first appearance in the index.
    pub async fn get_package_stats(&self, arch: &str) -> Result<Vec<RankedEntry>> {
        self.get_package_stats_variant(arch, ContentsVariant::Primary, DEFAULT_TOP_COUNT)
            .await
    }
}
