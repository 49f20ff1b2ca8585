// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian mirror HTTP client.

This module provides functionality for reading a directory of a Debian mirror
served via HTTP, e.g. `http://ftp.uk.debian.org/debian/dists/stable/main/`.
*/

use {
    crate::{
        error::{PackageStatsError, Result},
        io::DataResolver,
    },
    async_trait::async_trait,
    futures::{stream::TryStreamExt, AsyncRead},
    log::debug,
    reqwest::{Client, IntoUrl, Url},
    std::pin::Pin,
};

async fn fetch_url(
    client: &Client,
    root_url: &Url,
    path: &str,
) -> Result<Pin<Box<dyn AsyncRead + Send>>> {
    let url = root_url.join(path)?;
    debug!("fetching {}", url);

    let res = client.get(url.clone()).send().await.map_err(|e| {
        PackageStatsError::Fetch(
            url.to_string(),
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("error sending HTTP request: {:?}", e),
            ),
        )
    })?;
    let res = res.error_for_status().map_err(|e| {
        PackageStatsError::Fetch(
            url.to_string(),
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("bad HTTP status code: {:?}", e),
            ),
        )
    })?;

    Ok(Box::pin(
        res.bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", e)))
            .into_async_read(),
    ))
}

/// Client for a directory on a Debian mirror served via HTTP.
///
/// Instances are bound to a base URL. The content of the base URL itself is the
/// server generated directory listing. Other paths are resolved relative to it.
#[derive(Debug)]
pub struct HttpRepositoryClient {
    /// HTTP client to use.
    client: Client,

    /// Base URL of the mirror directory.
    root_url: Url,
}

impl HttpRepositoryClient {
    /// Construct an instance bound to the specified URL.
    pub fn new(url: impl IntoUrl) -> Result<Self> {
        Self::new_client(Client::default(), url)
    }

    /// Construct an instance using the given [Client] and URL.
    ///
    /// The URL should be the directory holding `Contents-*` files. e.g.
    /// `http://deb.debian.org/debian/dists/stable/main`.
    pub fn new_client(client: Client, url: impl IntoUrl) -> Result<Self> {
        let mut root_url = url.into_url()?;

        // Trailing URLs are significant to the Url type when we .join(). So ensure
        // the URL has a trailing path.
        if !root_url.path().ends_with('/') {
            root_url.set_path(&format!("{}/", root_url.path()));
        }

        Ok(Self { client, root_url })
    }

    /// The base URL this client is bound to.
    pub fn url(&self) -> &Url {
        &self.root_url
    }
}

#[async_trait]
impl DataResolver for HttpRepositoryClient {
    async fn get_path(&self, path: &str) -> Result<Pin<Box<dyn AsyncRead + Send>>> {
        fetch_url(&self.client, &self.root_url, path).await
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{ranking::DEFAULT_TOP_COUNT, stats::PackageStats},
    };

    const DEBIAN_STABLE_MAIN_URL: &str = "http://ftp.uk.debian.org/debian/dists/stable/main/";

    #[test]
    fn trailing_slash_added() -> Result<()> {
        let client = HttpRepositoryClient::new("http://deb.debian.org/debian/dists/stable/main")?;
        assert_eq!(
            client.url().as_str(),
            "http://deb.debian.org/debian/dists/stable/main/"
        );

        assert_eq!(
            client.url().join("Contents-amd64.gz")?.as_str(),
            "http://deb.debian.org/debian/dists/stable/main/Contents-amd64.gz"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_fetch_error() -> Result<()> {
        let client = HttpRepositoryClient::new("http://127.0.0.1:9/debian/")?;

        assert!(matches!(
            client.get_path("").await,
            Err(PackageStatsError::Fetch(_, _))
        ));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires network access to a Debian mirror"]
    async fn debian_stable_amd64() -> Result<()> {
        let stats = PackageStats::new(Box::new(HttpRepositoryClient::new(
            DEBIAN_STABLE_MAIN_URL,
        )?))
        .await?;

        for arch in ["amd64", "arm64", "i386"] {
            assert!(stats.get_archs().contains(&arch));
        }

        let top = stats.get_package_stats("amd64").await?;
        assert_eq!(top.len(), DEFAULT_TOP_COUNT);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));

        Ok(())
    }
}
