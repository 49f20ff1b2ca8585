// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! I/O helpers. */

use {
    crate::error::{PackageStatsError, Result},
    async_compression::futures::bufread::{
        BzDecoder, BzEncoder, GzipDecoder, GzipEncoder, LzmaDecoder, LzmaEncoder, XzDecoder,
        XzEncoder,
    },
    async_trait::async_trait,
    futures::{io::BufReader, AsyncBufRead, AsyncRead, AsyncReadExt},
    pin_project::pin_project,
    std::{
        pin::Pin,
        task::{Context, Poll},
    },
    thiserror::Error,
};

/// Compression format used by Debian primitives.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Compression {
    /// No compression (no extension).
    None,

    /// XZ compression (.xz extension).
    Xz,

    /// Gzip compression (.gz extension).
    Gzip,

    /// Bzip2 compression (.bz2 extension).
    Bzip2,

    /// LZMA compression (.lzma extension).
    Lzma,
}

impl Compression {
    /// Filename extension for files compressed in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Xz => ".xz",
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
            Self::Lzma => ".lzma",
        }
    }

    /// Resolve the format from a filename extension without its leading `.`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "xz" => Some(Self::Xz),
            "gz" => Some(Self::Gzip),
            "bz2" => Some(Self::Bzip2),
            "lzma" => Some(Self::Lzma),
            _ => None,
        }
    }

    /// The default retrieval preference order for client.
    pub fn default_preferred_order() -> impl Iterator<Item = Compression> {
        [Self::Xz, Self::Lzma, Self::Gzip, Self::Bzip2, Self::None].into_iter()
    }

    /// Position of this format in [Self::default_preferred_order()]. Lower is preferred.
    pub fn preference_rank(&self) -> usize {
        Self::default_preferred_order()
            .position(|c| c == *self)
            .unwrap_or(usize::MAX)
    }
}

/// Wrap a reader with transparent decompression.
pub fn read_decompressed<'a>(
    stream: Pin<Box<dyn AsyncBufRead + Send + 'a>>,
    compression: Compression,
) -> Pin<Box<dyn AsyncRead + Send + 'a>> {
    match compression {
        Compression::None => Box::pin(stream),
        Compression::Gzip => Box::pin(GzipDecoder::new(stream)),
        Compression::Xz => Box::pin(XzDecoder::new(stream)),
        Compression::Bzip2 => Box::pin(BzDecoder::new(stream)),
        Compression::Lzma => Box::pin(LzmaDecoder::new(stream)),
    }
}

/// Wrap a reader with transparent compression.
pub fn read_compressed<'a>(
    stream: impl AsyncBufRead + Send + 'a,
    compression: Compression,
) -> Pin<Box<dyn AsyncRead + Send + 'a>> {
    match compression {
        Compression::None => Box::pin(stream),
        Compression::Gzip => Box::pin(GzipEncoder::new(stream)),
        Compression::Xz => Box::pin(XzEncoder::new(stream)),
        Compression::Bzip2 => Box::pin(BzEncoder::new(stream)),
        Compression::Lzma => Box::pin(LzmaEncoder::new(stream)),
    }
}

/// Marks an I/O error as having originated in the transport rather than a decoder.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(std::io::Error);

impl TransportError {
    /// Wrap an I/O error so it can later be identified by [is_transport_error()].
    pub fn wrap(err: std::io::Error) -> std::io::Error {
        std::io::Error::new(err.kind(), Self(err))
    }
}

/// Whether an I/O error was produced by the transport layer.
pub fn is_transport_error(err: &std::io::Error) -> bool {
    err.get_ref()
        .map(|inner| inner.is::<TransportError>())
        .unwrap_or_default()
}

/// Convert an error raised while reading decoded content into a crate error.
///
/// Errors from the underlying transport become [PackageStatsError::Fetch]. Everything
/// else was raised by the decoder and becomes [PackageStatsError::Decompress].
pub fn classify_read_error(path: &str, err: std::io::Error) -> PackageStatsError {
    if is_transport_error(&err) {
        PackageStatsError::Fetch(path.to_string(), err)
    } else {
        PackageStatsError::Decompress(path.to_string(), err)
    }
}

/// An [AsyncRead] stream adapter that tags all errors from its source as [TransportError].
#[pin_project]
pub struct TransportReader<R> {
    #[pin]
    source: R,
}

impl<R> TransportReader<R> {
    /// Construct a new instance from a source reader.
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Consumes self, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R> AsyncRead for TransportReader<R>
where
    R: AsyncRead,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.project().source.poll_read(cx, buf) {
            Poll::Ready(Err(e)) => Poll::Ready(Err(TransportError::wrap(e))),
            res => res,
        }
    }
}

/// Generic mechanism for obtaining content at a given path.
///
/// This trait is used to define a generic mechanism for resolving content given
/// a lookup key/path. Paths are relative to the base location the implementation
/// is bound to. The empty path refers to the base location itself, whose content is
/// a directory listing.
///
/// Implementations only need to implement `get_path()`. The other members have
/// default implementations that should do the correct thing by default.
#[async_trait]
pub trait DataResolver: Sync {
    /// Get the content of a relative path as an async reader.
    ///
    /// This obtains a reader for path data and returns the raw data without any
    /// decoding applied. Dropping the reader releases the underlying resource.
    async fn get_path(&self, path: &str) -> Result<Pin<Box<dyn AsyncRead + Send>>>;

    /// Get the content of a relative path with decompression transparently applied.
    ///
    /// The returned reader is buffered so lines can be consumed directly. Read errors
    /// should be passed through [classify_read_error()] to tell transport failures
    /// apart from invalid compressed data.
    async fn get_path_decoded(
        &self,
        path: &str,
        compression: Compression,
    ) -> Result<Pin<Box<dyn AsyncBufRead + Send>>> {
        let source = TransportReader::new(self.get_path(path).await?);
        let decoded = read_decompressed(Box::pin(BufReader::new(source)), compression);

        Ok(Box::pin(BufReader::new(decoded)))
    }

    /// Get the content of a relative path as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    async fn get_path_text(&self, path: &str) -> Result<String> {
        let mut reader = self.get_path(path).await?;

        let mut data = vec![];
        reader
            .read_to_end(&mut data)
            .await
            .map_err(|e| PackageStatsError::Fetch(path.to_string(), e))?;

        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}
