// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! File count statistics for Debian `Contents` indices.

A Debian archive publishes, per component and architecture, a `Contents` index
mapping every file path to the binary packages that ship it. This crate fetches
such an index from a mirror, streams it through a decompressor, counts the
number of files owned by each package and ranks packages by that count.

The canonical home of this crate is <https://github.com/indygreg/PyOxidizer>. Please file issues
and pull requests there.

# A Tour of Functionality

[stats::PackageStats] is the main entry point. It is bound to a single mirror
directory (e.g. `http://ftp.uk.debian.org/debian/dists/stable/main/`), discovers
the published architectures on construction and exposes
[stats::PackageStats::get_package_stats()] to obtain the 10 packages with the most
files for an architecture.

Discovery of indices from the mirror's directory listing lives in the [catalog]
module. [catalog::ArchitectureCatalog] maps architecture names to the primary and
`udeb` index filenames.

The [contents] module parses the line format of `Contents` files.
[contents::ContentsStatsReader] and [contents::ContentsStatsAsyncReader] fold a
stream of lines into a [contents::FileCountTable]. The [ranking] module orders a
table by descending file count.

Content retrieval is abstracted by the [io::DataResolver] trait, which also
provides transparent decompression. Concrete implementations live in the
[repository] module: [repository::http::HttpRepositoryClient] reads from an
HTTP-hosted mirror and [repository::filesystem::FilesystemRepositoryReader]
reads from a local directory.

# Crate Features

The optional and enabled-by-default `http` feature enables HTTP client support for interacting
with Debian mirrors via HTTP.
*/

pub mod catalog;
pub mod contents;
pub mod error;
pub mod io;
pub mod ranking;
pub mod repository;
pub mod stats;
