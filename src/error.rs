//! Error types for console-sources
//!
//! All modules use `SourcesResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for console-sources operations
pub type SourcesResult<T> = Result<T, SourcesError>;

/// All errors that can occur while resolving and staging console sources
#[derive(Error, Debug)]
pub enum SourcesError {
    // Configuration errors
    #[error("Options did not pass validation")]
    InvalidOptions { errors: Vec<String> },

    // Release metadata errors
    #[error("Release lookup failed: {0}")]
    Release(String),

    #[error("Release tag not found: {0}")]
    TagNotFound(String),

    #[error("Release {tag} is older than the minimum supported major version {minimum}")]
    TagTooOld { tag: String, minimum: u64 },

    // Transport errors
    #[error("Download failed for {url}: {reason}")]
    Transport { url: String, reason: String },

    // Archive errors
    #[error("Unable to unzip the console sources: {0}")]
    Unzip(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SourcesError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a transport error for a URL
    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidOptions { .. } => {
                Some("Run with --help to see the supported options")
            }
            Self::TagNotFound(_) => {
                Some("List release tags with: gh release list -R mulesoft/api-console")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SourcesError::Unzip("truncated archive".to_string());
        assert!(err.to_string().contains("Unable to unzip"));
    }

    #[test]
    fn error_hint() {
        let err = SourcesError::InvalidOptions { errors: vec![] };
        assert!(err.hint().unwrap().contains("--help"));
        assert!(SourcesError::Internal("x".to_string()).hint().is_none());
    }

    #[test]
    fn io_helper_keeps_context() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SourcesError::io("writing cache entry", io);
        assert!(err.to_string().contains("writing cache entry"));
    }
}
