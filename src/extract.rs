//! Zip extraction and destination normalization
//!
//! Extraction consumes a [`ZipSource`]: a seekable byte source that is either
//! an archive on disk or downloaded bytes held in memory. GitHub release
//! archives wrap everything in a single commit-qualified top directory, so
//! [`strip_single_root`] is chained after every extraction to flatten it.

use crate::error::{SourcesError, SourcesResult};
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// A readable, seekable archive source consumed by the extractor.
#[derive(Debug)]
pub enum ZipSource {
    /// A zip file on the local filesystem.
    File(PathBuf),

    /// Downloaded archive bytes, read through an in-memory cursor.
    Memory(Vec<u8>),
}

impl ZipSource {
    /// Extract every entry of the archive into `destination`, creating it if
    /// absent and preserving the archive's internal directory structure.
    ///
    /// A malformed or truncated archive fails with [`SourcesError::Unzip`];
    /// the destination may then hold a partial tree.
    pub async fn extract_to(self, destination: &Path) -> SourcesResult<()> {
        let destination = destination.to_path_buf();
        tokio::task::spawn_blocking(move || match self {
            ZipSource::File(path) => {
                let file = File::open(&path).map_err(|e| {
                    SourcesError::io(format!("opening zip file {}", path.display()), e)
                })?;
                extract_entries(file, &destination)
            }
            ZipSource::Memory(bytes) => extract_entries(Cursor::new(bytes), &destination),
        })
        .await
        .map_err(|e| SourcesError::Internal(format!("extraction task failed: {}", e)))?
    }
}

fn extract_entries<R: Read + Seek>(reader: R, destination: &Path) -> SourcesResult<()> {
    std::fs::create_dir_all(destination).map_err(|e| {
        SourcesError::io(
            format!("creating destination {}", destination.display()),
            e,
        )
    })?;

    let mut archive =
        ZipArchive::new(reader).map_err(|e| SourcesError::Unzip(e.to_string()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| SourcesError::Unzip(e.to_string()))?;

        // Entries with traversal-unsafe names are skipped, not extracted
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = destination.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| SourcesError::io(format!("creating {}", outpath.display()), e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SourcesError::io(format!("creating {}", parent.display()), e))?;
        }
        let mut outfile = File::create(&outpath)
            .map_err(|e| SourcesError::io(format!("creating {}", outpath.display()), e))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| SourcesError::Unzip(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode));
            }
        }
    }

    debug!("Zip file has been extracted to {}", destination.display());
    Ok(())
}

/// Collapse a single enclosing top-level folder left by an archive service.
///
/// When `destination` holds exactly one child and it is a directory, that
/// directory's contents are copied up into `destination` itself. More than
/// one child, or a single file child, leaves the tree untouched. The child
/// directory itself is not removed.
pub async fn strip_single_root(destination: &Path) -> SourcesResult<()> {
    let mut entries = tokio::fs::read_dir(destination).await.map_err(|e| {
        SourcesError::io(format!("reading {}", destination.display()), e)
    })?;

    let mut only_child: Option<PathBuf> = None;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SourcesError::io(format!("reading {}", destination.display()), e))?
    {
        if only_child.is_some() {
            // Already flat
            return Ok(());
        }
        only_child = Some(entry.path());
    }

    let Some(child) = only_child else {
        return Ok(());
    };
    let meta = tokio::fs::metadata(&child)
        .await
        .map_err(|e| SourcesError::io(format!("reading {}", child.display()), e))?;
    if !meta.is_dir() {
        return Ok(());
    }

    debug!("Collapsing top-level folder {}", child.display());
    copy_dir_all(&child, destination).await
}

/// Recursively copy the contents of `from` into `to`, overwriting existing
/// files. No filtering is applied.
pub async fn copy_dir_all(from: &Path, to: &Path) -> SourcesResult<()> {
    let from = from.to_path_buf();
    let to = to.to_path_buf();
    tokio::task::spawn_blocking(move || copy_dir_sync(&from, &to))
        .await
        .map_err(|e| SourcesError::Internal(format!("copy task failed: {}", e)))?
}

fn copy_dir_sync(from: &Path, to: &Path) -> SourcesResult<()> {
    std::fs::create_dir_all(to)
        .map_err(|e| SourcesError::io(format!("creating {}", to.display()), e))?;
    let entries = std::fs::read_dir(from)
        .map_err(|e| SourcesError::io(format!("reading {}", from.display()), e))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| SourcesError::io(format!("reading {}", from.display()), e))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| SourcesError::io(format!("reading {}", source.display()), e))?;
        if file_type.is_dir() {
            copy_dir_sync(&source, &target)?;
        } else {
            std::fs::copy(&source, &target).map_err(|e| {
                SourcesError::io(
                    format!("copying {} to {}", source.display(), target.display()),
                    e,
                )
            })?;
        }
    }
    Ok(())
}
