// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use {crate::catalog::ContentsVariant, thiserror::Error};

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum PackageStatsError {
    #[error("{0} is not a recognized system architecture.")]
    UnknownArchitecture(String),

    #[error("no {1} Contents index advertised for architecture {0}")]
    ContentsIndexMissing(String, ContentsVariant),

    #[error("error fetching {0}: {1}")]
    Fetch(String, std::io::Error),

    #[error("error decompressing {0}: {1}")]
    Decompress(String, std::io::Error),

    #[error("malformed Contents line {line_number}: {line:?}")]
    Parse { line_number: usize, line: String },

    #[error("unsupported repository location: {0}")]
    UnsupportedLocation(String),

    #[error("URL error: {0:?}")]
    Url(#[from] url::ParseError),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0:?}")]
    Reqwest(#[from] reqwest::Error),

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, PackageStatsError>;
