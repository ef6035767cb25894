//! On-disk cache of downloaded release archives
//!
//! Archives are stored under the user's application-data folder as
//! `api-console/cache/sources/<tag>.zip`, keyed by the tag name with a
//! leading `v` stripped. Presence of the file is the only hit signal:
//! there is no expiry, no size bound, and no integrity checksum.

use crate::error::{SourcesError, SourcesResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Maps release tags to cached archive files on the local filesystem.
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    /// Create a cache rooted at the platform application-data directory.
    pub fn new() -> Self {
        Self {
            root: Self::locate_app_dir(),
        }
    }

    /// Create a cache rooted at an explicit directory (used by tests).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory cached archives live in. Derived once at construction.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the platform cache root:
    /// `$APPDATA` if set, `~/Library/Preferences` on macOS, `~/.config` on
    /// Linux, `/var/local` otherwise.
    fn locate_app_dir() -> PathBuf {
        let base = if let Some(appdata) = std::env::var_os("APPDATA") {
            PathBuf::from(appdata)
        } else if cfg!(target_os = "macos") {
            dirs::home_dir()
                .map(|home| home.join("Library").join("Preferences"))
                .unwrap_or_else(|| PathBuf::from("/var/local"))
        } else if cfg!(target_os = "linux") {
            dirs::home_dir()
                .map(|home| home.join(".config"))
                .unwrap_or_else(|| PathBuf::from("/var/local"))
        } else {
            PathBuf::from("/var/local")
        };
        base.join("api-console").join("cache").join("sources")
    }

    /// Strip a single leading `v` from a tag name: `v5.0.0` becomes `5.0.0`,
    /// `5.0.0-preview` is returned unchanged.
    pub fn normalize_tag(tag: &str) -> &str {
        tag.strip_prefix('v').unwrap_or(tag)
    }

    fn entry_path(&self, tag: &str) -> PathBuf {
        self.root.join(format!("{}.zip", Self::normalize_tag(tag)))
    }

    /// Location of the cached archive for `tag`, or `None` when no entry
    /// exists. Absence is not an error.
    pub async fn cached_path(&self, tag: &str) -> Option<PathBuf> {
        let location = self.entry_path(tag);
        match fs::try_exists(&location).await {
            Ok(true) => Some(location),
            _ => None,
        }
    }

    /// Write a downloaded archive to the cache entry for `tag`, creating the
    /// cache directory as needed and overwriting any prior content.
    pub async fn write(&self, bytes: &[u8], tag: &str) -> SourcesResult<PathBuf> {
        let location = self.entry_path(tag);
        fs::create_dir_all(&self.root).await.map_err(|e| {
            SourcesError::io(
                format!("creating cache directory {}", self.root.display()),
                e,
            )
        })?;
        fs::write(&location, bytes).await.map_err(|e| {
            SourcesError::io(format!("writing cache entry {}", location.display()), e)
        })?;
        debug!("Cached sources at {}", location.display());
        Ok(location)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
