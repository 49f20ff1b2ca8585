// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Access to Debian mirror directories.

A mirror directory is a location holding `Contents` indices, such as
`dists/<distribution>/<component>/` of a Debian archive. See
<https://wiki.debian.org/DebianRepository/Format> for the canonical definition
of the archive layout.
*/

use {
    crate::{
        error::{PackageStatsError, Result},
        io::DataResolver,
    },
    url::Url,
};

pub mod filesystem;
#[cfg(feature = "http")]
pub mod http;

/// Construct a [DataResolver] from a string describing a mirror location.
///
/// If the value contains `://`, it is parsed as a URL. `http://` and `https://`
/// URLs resolve to an HTTP client (requires the `http` feature) and `file://` URLs
/// resolve to a local directory. Otherwise the value is interpreted as a local
/// filesystem path.
pub fn resolver_from_location(location: &str) -> Result<Box<dyn DataResolver + Send>> {
    if !location.contains("://") {
        return Ok(Box::new(filesystem::FilesystemRepositoryReader::new(
            location,
        )));
    }

    let url = Url::parse(location)?;

    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| PackageStatsError::UnsupportedLocation(location.to_string()))?;

            Ok(Box::new(filesystem::FilesystemRepositoryReader::new(path)))
        }
        #[cfg(feature = "http")]
        "http" | "https" => Ok(Box::new(http::HttpRepositoryClient::new(url)?)),
        _ => Err(PackageStatsError::UnsupportedLocation(location.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unsupported_schemes() {
        for location in ["s3://bucket/debian", "ftp://ftp.debian.org/debian"] {
            assert!(matches!(
                resolver_from_location(location),
                Err(PackageStatsError::UnsupportedLocation(_))
            ));
        }
    }

    #[test]
    fn supported_locations() -> Result<()> {
        resolver_from_location("/srv/mirror/debian/dists/stable/main")?;
        resolver_from_location("file:///srv/mirror/debian/dists/stable/main")?;
        #[cfg(feature = "http")]
        resolver_from_location("http://ftp.uk.debian.org/debian/dists/stable/main/")?;

        Ok(())
    }
}
