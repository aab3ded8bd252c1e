//! Cleanup of the on-disk access token written by older versions.

use std::io;
use std::path::{Path, PathBuf};

use ledger_application::LegacyCredentials;
use tracing::debug;

/// Default location of the legacy token file under the user data directory.
#[must_use]
pub fn default_token_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("ledger").join("access_token"))
}

/// A token file left behind by an older version. Only ever removed.
#[derive(Debug, Clone)]
pub struct LegacyTokenFile {
    path: PathBuf,
}

impl LegacyTokenFile {
    /// Points at the file to purge.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LegacyCredentials for LegacyTokenFile {
    fn purge(&self) -> io::Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "legacy token file removed");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}
