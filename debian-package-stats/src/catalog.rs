// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Discovery of `Contents` indices from a directory listing.

A mirror directory such as `dists/stable/main/` advertises one `Contents`
index per architecture, e.g. `Contents-amd64.gz`, plus a variant for installer
packages, e.g. `Contents-udeb-amd64.gz`. This module scrapes those filenames out
of the free-form listing document and exposes the result as a mapping from
architecture name to index filenames. Nothing outside this module depends on the
textual shape of the listing.
*/

use {
    crate::{
        error::Result,
        io::{Compression, DataResolver},
    },
    log::{debug, info},
    once_cell::sync::Lazy,
    regex::Regex,
    std::{
        collections::BTreeMap,
        fmt::{Display, Formatter},
    },
};

/// Regular expression matching a quoted `Contents` index filename.
pub static RE_CONTENTS_FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        "
        (?P<filename>
            Contents-
            # Installer packages have their own index.
            (?P<udeb>udeb-)?
            (?P<arch>[a-z0-9]+)
            \.
            (?P<ext>gz|xz|bz2|lzma)
        )
        "
        "#,
    )
    .unwrap()
});

/// Flavor of `Contents` index published for an architecture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContentsVariant {
    /// The index covering regular binary packages.
    Primary,
    /// The index covering `udeb` packages used by installers.
    Udeb,
}

impl Default for ContentsVariant {
    fn default() -> Self {
        Self::Primary
    }
}

impl Display for ContentsVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Udeb => write!(f, "udeb"),
        }
    }
}

/// A single compressed `Contents` index advertised by the listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentsIndexFile {
    /// Filename relative to the base location.
    pub filename: String,
    /// Compression format, derived from the filename extension.
    pub compression: Compression,
}

/// The `Contents` indices advertised for one architecture.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContentsIndexFiles {
    /// The regular `Contents-<arch>` index.
    pub primary: Option<ContentsIndexFile>,
    /// The `Contents-udeb-<arch>` index.
    pub udeb: Option<ContentsIndexFile>,
}

impl ContentsIndexFiles {
    /// Obtain the index for a given variant.
    pub fn get(&self, variant: ContentsVariant) -> Option<&ContentsIndexFile> {
        match variant {
            ContentsVariant::Primary => self.primary.as_ref(),
            ContentsVariant::Udeb => self.udeb.as_ref(),
        }
    }

    fn slot_mut(&mut self, variant: ContentsVariant) -> &mut Option<ContentsIndexFile> {
        match variant {
            ContentsVariant::Primary => &mut self.primary,
            ContentsVariant::Udeb => &mut self.udeb,
        }
    }
}

/// Mapping of architecture names to their advertised `Contents` indices.
#[derive(Clone, Debug, Default)]
pub struct ArchitectureCatalog {
    architectures: BTreeMap<String, ContentsIndexFiles>,
}

impl ArchitectureCatalog {
    /// Fetch the listing at the root of a [DataResolver] and parse it.
    pub async fn resolve(resolver: &dyn DataResolver) -> Result<Self> {
        let listing = resolver.get_path_text("").await?;
        let catalog = Self::from_listing(&listing);

        info!(
            "discovered Contents indices for {} architectures",
            catalog.len()
        );

        Ok(catalog)
    }

    /// Construct an instance by scraping a directory listing document.
    pub fn from_listing(listing: &str) -> Self {
        let mut catalog = Self::default();

        for line in listing.lines().filter(|line| line.contains("Contents-")) {
            for caps in RE_CONTENTS_FILENAME.captures_iter(line) {
                let compression = match Compression::from_extension(&caps["ext"]) {
                    Some(compression) => compression,
                    None => continue,
                };

                let variant = if caps.name("udeb").is_some() {
                    ContentsVariant::Udeb
                } else {
                    ContentsVariant::Primary
                };

                catalog.add_index(
                    &caps["arch"],
                    variant,
                    ContentsIndexFile {
                        filename: caps["filename"].to_string(),
                        compression,
                    },
                );
            }
        }

        catalog
    }

    /// Register an index for an architecture.
    ///
    /// If the architecture already has an index of this variant in a different
    /// compression format, the format preferred by
    /// [Compression::default_preferred_order()] is kept. Otherwise the new entry
    /// replaces the old one.
    pub fn add_index(
        &mut self,
        architecture: &str,
        variant: ContentsVariant,
        file: ContentsIndexFile,
    ) {
        let slot = self
            .architectures
            .entry(architecture.to_string())
            .or_default()
            .slot_mut(variant);

        if let Some(existing) = slot.as_ref() {
            if existing.compression != file.compression
                && existing.compression.preference_rank() < file.compression.preference_rank()
            {
                debug!(
                    "ignoring {}; {} is preferred",
                    file.filename, existing.filename
                );
                return;
            }
        }

        *slot = Some(file);
    }

    /// Obtain the indices advertised for an architecture.
    pub fn get(&self, architecture: &str) -> Option<&ContentsIndexFiles> {
        self.architectures.get(architecture)
    }

    /// Whether an architecture is known.
    pub fn contains(&self, architecture: &str) -> bool {
        self.architectures.contains_key(architecture)
    }

    /// Obtain an iterator of known architecture names, in sorted order.
    pub fn architectures(&self) -> impl Iterator<Item = &str> + '_ {
        self.architectures.keys().map(|x| x.as_str())
    }

    /// The number of known architectures.
    pub fn len(&self) -> usize {
        self.architectures.len()
    }

    /// Whether no architectures are known.
    pub fn is_empty(&self) -> bool {
        self.architectures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, indoc::indoc};

    const LISTING: &str = indoc! {r#"
        <html>
        <head><title>Index of /debian/dists/stable/main/</title></head>
        <body>
        <h1>Index of /debian/dists/stable/main/</h1><hr><pre><a href="../">../</a>
        <a href="binary-all/">binary-all/</a>                                        09-Aug-2025 09:27       -
        <a href="binary-amd64/">binary-amd64/</a>                                      09-Aug-2025 09:27       -
        <a href="Contents-all.gz">Contents-all.gz</a>                                    09-Aug-2025 08:35       28M
        <a href="Contents-amd64.gz">Contents-amd64.gz</a>                                  09-Aug-2025 08:39       13M
        <a href="Contents-arm64.gz">Contents-arm64.gz</a>                                  09-Aug-2025 08:43       13M
        <a href="Contents-source.gz">Contents-source.gz</a>                                 09-Aug-2025 08:50       16M
        <a href="Contents-udeb-amd64.gz">Contents-udeb-amd64.gz</a>                             09-Aug-2025 08:40       30K
        <a href="Contents-udeb-mips64el.gz">Contents-udeb-mips64el.gz</a>                          09-Aug-2025 08:42       30K
        <a href="Release">Release</a>                                            09-Aug-2025 08:30     193
        </pre><hr></body>
        </html>
    "#};

    fn file(filename: &str) -> ContentsIndexFile {
        ContentsIndexFile {
            filename: filename.to_string(),
            compression: Compression::Gzip,
        }
    }

    #[test]
    fn parse_html_listing() {
        let catalog = ArchitectureCatalog::from_listing(LISTING);

        assert_eq!(
            catalog.architectures().collect::<Vec<_>>(),
            vec!["all", "amd64", "arm64", "mips64el", "source"]
        );

        let amd64 = catalog.get("amd64").unwrap();
        assert_eq!(amd64.primary, Some(file("Contents-amd64.gz")));
        assert_eq!(amd64.udeb, Some(file("Contents-udeb-amd64.gz")));

        let arm64 = catalog.get("arm64").unwrap();
        assert_eq!(
            arm64.get(ContentsVariant::Primary),
            Some(&file("Contents-arm64.gz"))
        );
        assert_eq!(arm64.get(ContentsVariant::Udeb), None);

        // Only an installer index is advertised.
        let mips64el = catalog.get("mips64el").unwrap();
        assert_eq!(mips64el.primary, None);
        assert_eq!(mips64el.udeb, Some(file("Contents-udeb-mips64el.gz")));

        assert!(!catalog.contains("binary"));
        assert!(!catalog.contains("Release"));
    }

    #[test]
    fn udeb_and_primary_share_architecture() {
        let catalog = ArchitectureCatalog::from_listing(
            "\"Contents-udeb-amd64.gz\"\r\n\"Contents-amd64.gz\"\r\n",
        );

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.architectures().collect::<Vec<_>>(), vec!["amd64"]);

        let amd64 = catalog.get("amd64").unwrap();
        assert_eq!(amd64.primary, Some(file("Contents-amd64.gz")));
        assert_eq!(amd64.udeb, Some(file("Contents-udeb-amd64.gz")));
    }

    #[test]
    fn unquoted_and_unknown_suffixes_ignored() {
        let catalog = ArchitectureCatalog::from_listing(indoc! {r#"
            Contents-amd64.gz
            "Contents-i386.zst"
            "Contents-udeb-nf-i386.gz"
            "Contents-s390x.xz"
        "#});

        assert_eq!(catalog.architectures().collect::<Vec<_>>(), vec!["s390x"]);
        assert_eq!(
            catalog.get("s390x").unwrap().primary,
            Some(ContentsIndexFile {
                filename: "Contents-s390x.xz".to_string(),
                compression: Compression::Xz,
            })
        );
    }

    #[test]
    fn preferred_compression_wins() {
        let catalog = ArchitectureCatalog::from_listing(indoc! {r#"
            "Contents-armhf.xz"
            "Contents-armhf.gz"
            "Contents-i386.gz"
            "Contents-i386.xz"
        "#});

        for arch in ["armhf", "i386"] {
            assert_eq!(
                catalog.get(arch).unwrap().primary.as_ref().unwrap().compression,
                Compression::Xz
            );
        }
    }

    #[test]
    fn empty_listing() {
        let catalog = ArchitectureCatalog::from_listing("<html></html>");
        assert!(catalog.is_empty());
        assert_eq!(catalog.get("amd64"), None);
    }
}
