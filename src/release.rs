//! Release metadata lookup
//!
//! The resolver only needs "latest" and "by tag" lookups that yield a tag
//! name plus an archive URL. [`GithubReleaseSource`] is the default
//! implementation over the GitHub releases API; tests substitute their own
//! [`ReleaseSource`].

use crate::cache::Cache;
use crate::error::{SourcesError, SourcesResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Identifying header sent with every GitHub request.
pub const USER_AGENT: &str = "mulesoft-labs/api-console-sources-resolver";

/// Tag name and archive URL of a single release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub zipball_url: String,
}

/// Resolves release metadata for the console sources repository.
///
/// Failures (tag not found, rate limit, network) are propagated verbatim by
/// the resolver and never retried there.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Metadata of the latest published release.
    async fn latest_info(&self) -> SourcesResult<ReleaseInfo>;

    /// Metadata of the release published under `tag`.
    async fn tag_info(&self, tag: &str) -> SourcesResult<ReleaseInfo>;
}

/// Release lookup against the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubReleaseSource {
    owner: String,
    repo: String,
    minimum_tag_major: u64,
}

impl GithubReleaseSource {
    /// Earliest console major version this tool can stage.
    pub const DEFAULT_MINIMUM_TAG_MAJOR: u64 = 4;

    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            minimum_tag_major: Self::DEFAULT_MINIMUM_TAG_MAJOR,
        }
    }

    /// Override the minimum accepted tag major version.
    pub fn with_minimum_tag_major(mut self, minimum: u64) -> Self {
        self.minimum_tag_major = minimum;
        self
    }

    /// Parse an `owner/repo` slug.
    pub fn from_slug(slug: &str) -> SourcesResult<Self> {
        match slug.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(SourcesError::Internal(format!(
                "Invalid repository slug '{}'. Expected format: owner/repo",
                slug
            ))),
        }
    }

    fn release_url(&self, suffix: &str) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/releases/{}",
            self.owner, self.repo, suffix
        )
    }

    /// Reject tags older than the minimum supported major version. Tags that
    /// do not parse as semver are passed through.
    fn check_minimum(&self, info: &ReleaseInfo) -> SourcesResult<()> {
        let normalized = Cache::normalize_tag(&info.tag_name);
        if let Ok(version) = semver::Version::parse(normalized) {
            if version.major < self.minimum_tag_major {
                return Err(SourcesError::TagTooOld {
                    tag: info.tag_name.clone(),
                    minimum: self.minimum_tag_major,
                });
            }
        }
        Ok(())
    }

    async fn fetch(&self, url: String, tag: Option<String>) -> SourcesResult<ReleaseInfo> {
        debug!("Requesting release info from {}", url);
        let info = tokio::task::spawn_blocking(move || -> SourcesResult<ReleaseInfo> {
            let mut response = ureq::get(&url)
                .header("user-agent", USER_AGENT)
                .header("accept", "application/vnd.github.v3+json")
                .call()
                .map_err(|e| match (&e, &tag) {
                    (ureq::Error::StatusCode(404), Some(tag)) => {
                        SourcesError::TagNotFound(tag.clone())
                    }
                    _ => SourcesError::Release(e.to_string()),
                })?;
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| SourcesError::Release(e.to_string()))?;
            serde_json::from_str::<ReleaseInfo>(&body)
                .map_err(|e| SourcesError::Release(e.to_string()))
        })
        .await
        .map_err(|e| SourcesError::Internal(format!("release lookup task failed: {}", e)))??;

        self.check_minimum(&info)?;
        Ok(info)
    }
}

#[async_trait]
impl ReleaseSource for GithubReleaseSource {
    async fn latest_info(&self) -> SourcesResult<ReleaseInfo> {
        self.fetch(self.release_url("latest"), None).await
    }

    async fn tag_info(&self, tag: &str) -> SourcesResult<ReleaseInfo> {
        self.fetch(
            self.release_url(&format!("tags/{}", tag)),
            Some(tag.to_string()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_info_deserializes_github_payload() {
        let payload = r#"{
            "tag_name": "v5.0.0",
            "zipball_url": "https://api.github.com/repos/mulesoft/api-console/zipball/v5.0.0",
            "name": "5.0.0",
            "prerelease": false
        }"#;
        let info: ReleaseInfo = serde_json::from_str(payload).unwrap();
        assert_eq!(info.tag_name, "v5.0.0");
        assert!(info.zipball_url.ends_with("zipball/v5.0.0"));
    }

    #[test]
    fn slug_parses() {
        let source = GithubReleaseSource::from_slug("mulesoft/api-console").unwrap();
        assert_eq!(
            source.release_url("latest"),
            "https://api.github.com/repos/mulesoft/api-console/releases/latest"
        );
    }

    #[test]
    fn bad_slug_rejected() {
        assert!(GithubReleaseSource::from_slug("nope").is_err());
        assert!(GithubReleaseSource::from_slug("/x").is_err());
        assert!(GithubReleaseSource::from_slug("x/").is_err());
    }

    #[test]
    fn minimum_major_enforced() {
        let source = GithubReleaseSource::new("mulesoft", "api-console");
        let old = ReleaseInfo {
            tag_name: "v3.0.1".to_string(),
            zipball_url: "test".to_string(),
        };
        assert!(matches!(
            source.check_minimum(&old),
            Err(SourcesError::TagTooOld { minimum: 4, .. })
        ));

        let ok = ReleaseInfo {
            tag_name: "v4.0.0".to_string(),
            zipball_url: "test".to_string(),
        };
        assert!(source.check_minimum(&ok).is_ok());
    }

    #[test]
    fn minimum_major_skips_non_semver_tags() {
        let source = GithubReleaseSource::new("mulesoft", "api-console");
        let odd = ReleaseInfo {
            tag_name: "preview".to_string(),
            zipball_url: "test".to_string(),
        };
        assert!(source.check_minimum(&odd).is_ok());
    }

    #[test]
    fn minimum_major_override() {
        let source =
            GithubReleaseSource::new("mulesoft", "api-console").with_minimum_tag_major(6);
        let info = ReleaseInfo {
            tag_name: "v5.0.0".to_string(),
            zipball_url: "test".to_string(),
        };
        assert!(matches!(
            source.check_minimum(&info),
            Err(SourcesError::TagTooOld { minimum: 6, .. })
        ));
    }
}
