//! Source resolution and staging pipeline
//!
//! [`SourcesResolver`] owns the validated options, the archive cache, and
//! handles to the two collaborators (release metadata lookup and byte
//! transport). One call to [`SourcesResolver::sources_to`] picks exactly one
//! retrieval strategy, produces an archive or a local tree, and leaves the
//! destination holding the fully staged, normalized sources.

use crate::cache::Cache;
use crate::error::{SourcesError, SourcesResult};
use crate::extract::{copy_dir_all, strip_single_root, ZipSource};
use crate::options::SourceOptions;
use crate::release::{ReleaseInfo, ReleaseSource, USER_AGENT};
use crate::transport::Transport;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The four mutually exclusive retrieval strategies.
///
/// Selection is a pure function of the options: validation guarantees
/// `tag_name` and `src` are never both set, so exactly one branch applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Latest published release.
    Latest,

    /// The release published under this tag.
    Tagged(String),

    /// A zip archive fetched from this URL, never cached.
    RemoteZip(String),

    /// A local zip file or directory.
    Local(String),
}

impl Strategy {
    /// Pick the strategy for a set of valid options.
    pub fn select(opts: &SourceOptions) -> Strategy {
        match (&opts.tag_name, &opts.src) {
            (Some(tag), _) => Strategy::Tagged(tag.clone()),
            (None, Some(src)) if src.starts_with("http") => Strategy::RemoteZip(src.clone()),
            (None, Some(src)) => Strategy::Local(src.clone()),
            (None, None) => Strategy::Latest,
        }
    }
}

/// Resolves console sources and stages them into a destination directory.
///
/// Reusable: each [`sources_to`](Self::sources_to) call is independent and
/// idempotent with respect to cache content. Concurrent calls against the
/// same destination are not coordinated.
pub struct SourcesResolver {
    opts: SourceOptions,
    cache: Cache,
    release_source: Arc<dyn ReleaseSource>,
    transport: Arc<dyn Transport>,
}

impl SourcesResolver {
    /// Construct a resolver, failing fast on invalid options.
    ///
    /// Every validation error and warning is logged before the error is
    /// returned, so the caller sees the complete list in one pass.
    pub fn new(
        opts: SourceOptions,
        release_source: Arc<dyn ReleaseSource>,
        transport: Arc<dyn Transport>,
    ) -> SourcesResult<Self> {
        for warning in opts.validation_warnings() {
            warn!("{}", warning);
        }
        if !opts.is_valid() {
            for message in opts.validation_errors() {
                error!("{}", message);
            }
            return Err(SourcesError::InvalidOptions {
                errors: opts.validation_errors().to_vec(),
            });
        }
        Ok(Self {
            opts,
            cache: Cache::new(),
            release_source,
            transport,
        })
    }

    /// Replace the default cache location (used by tests).
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = cache;
        self
    }

    /// Resolve and stage the console sources into `destination`.
    ///
    /// Resolves once the destination holds the extracted (or copied) source
    /// tree with any single enclosing archive folder collapsed.
    pub async fn sources_to(&self, destination: &Path) -> SourcesResult<()> {
        match Strategy::select(&self.opts) {
            Strategy::Latest => {
                debug!("Downloading latest release info...");
                let info = self.release_source.latest_info().await?;
                self.download_from_release(info, destination).await
            }
            Strategy::Tagged(tag) => {
                debug!("Getting {} release info...", tag);
                let info = self.release_source.tag_info(&tag).await?;
                self.download_from_release(info, destination).await
            }
            Strategy::RemoteZip(url) => {
                debug!("Downloading console sources from {}", url);
                let bytes = self.fetch(&url).await?;
                self.extract_bytes(bytes, destination).await
            }
            Strategy::Local(path) => self.copy_local(Path::new(&path), destination).await,
        }
    }

    /// Cache lookup, archive download, best-effort cache write, extraction.
    async fn download_from_release(
        &self,
        info: ReleaseInfo,
        destination: &Path,
    ) -> SourcesResult<()> {
        if !self.opts.ignore_cache {
            if let Some(location) = self.cache.cached_path(&info.tag_name).await {
                debug!("Reusing cached console sources...");
                ZipSource::File(location).extract_to(destination).await?;
                return strip_single_root(destination).await;
            }
        }

        debug!("Downloading release tagged as: {}", info.tag_name);
        let bytes = self.fetch(&info.zipball_url).await?;

        // A cache-write failure never aborts the pipeline; the downloaded
        // bytes are still usable for extraction.
        if let Err(e) = self.cache.write(&bytes, &info.tag_name).await {
            warn!("Could not cache console sources: {}", e);
        }

        self.extract_bytes(bytes, destination).await
    }

    /// Stage sources from a local zip file or directory.
    ///
    /// A file is treated as a zip archive and extracted (with top-folder
    /// collapse); a directory is copied verbatim, no filtering and no
    /// collapse.
    async fn copy_local(&self, from: &Path, to: &Path) -> SourcesResult<()> {
        debug!("Copying local console files to the working dir.");
        let meta = tokio::fs::metadata(from).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourcesError::PathNotFound(from.to_path_buf())
            } else {
                SourcesError::io(format!("reading {}", from.display()), e)
            }
        })?;

        if meta.is_file() {
            debug!("Opening local zip file of the console.");
            ZipSource::File(from.to_path_buf()).extract_to(to).await?;
            return strip_single_root(to).await;
        }

        debug!("Copying files from {}", from.display());
        copy_dir_all(from, to).await
    }

    async fn fetch(&self, url: &str) -> SourcesResult<Vec<u8>> {
        let headers: HashMap<String, String> =
            HashMap::from([("user-agent".to_string(), USER_AGENT.to_string())]);
        self.transport.get(url, &headers).await
    }

    async fn extract_bytes(&self, bytes: Vec<u8>, destination: &Path) -> SourcesResult<()> {
        ZipSource::Memory(bytes).extract_to(destination).await?;
        strip_single_root(destination).await
    }
}
