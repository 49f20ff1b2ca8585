// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Filesystem based Debian mirror directories. */

use {
    crate::{
        error::{PackageStatsError, Result},
        io::DataResolver,
    },
    async_trait::async_trait,
    futures::{io::Cursor, AsyncRead},
    log::debug,
    std::{
        path::{Path, PathBuf},
        pin::Pin,
    },
};

/// A readable interface to a mirror directory on a local filesystem.
///
/// The empty path resolves to a listing of the directory, with each entry name
/// quoted on its own line. This mirrors what an HTTP server's index page exposes.
#[derive(Clone, Debug)]
pub struct FilesystemRepositoryReader {
    root_dir: PathBuf,
}

impl FilesystemRepositoryReader {
    /// Construct a new instance, bound to the root directory specified.
    ///
    /// No validation of the passed path is performed.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_dir: path.as_ref().to_path_buf(),
        }
    }

    /// The directory this reader is bound to.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn listing(&self) -> Result<String> {
        let entries = std::fs::read_dir(&self.root_dir)
            .map_err(|e| PackageStatsError::Fetch(format!("{}", self.root_dir.display()), e))?;

        let mut names = vec![];
        for entry in entries {
            let entry = entry
                .map_err(|e| PackageStatsError::Fetch(format!("{}", self.root_dir.display()), e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| format!("\"{}\"\n", name))
            .collect())
    }
}

#[async_trait]
impl DataResolver for FilesystemRepositoryReader {
    async fn get_path(&self, path: &str) -> Result<Pin<Box<dyn AsyncRead + Send>>> {
        if path.is_empty() {
            debug!("listing {}", self.root_dir.display());
            return Ok(Box::pin(Cursor::new(self.listing()?.into_bytes())));
        }

        let path = self.root_dir.join(path);
        debug!("opening {}", path.display());

        let f = std::fs::File::open(&path)
            .map_err(|e| PackageStatsError::Fetch(format!("{}", path.display()), e))?;

        Ok(Box::pin(futures::io::AllowStdIo::new(f)))
    }
}
