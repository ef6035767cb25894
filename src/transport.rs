//! Byte transport for archive downloads
//!
//! The resolver only needs "GET this URL with these headers and give me the
//! full body". [`HttpTransport`] is the default implementation; tests
//! substitute their own [`Transport`] to count or fake downloads.

use crate::error::{SourcesError, SourcesResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Fetches the full body of a URL. No retry and no timeout policy beyond the
/// HTTP client defaults; failures propagate to the caller untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &HashMap<String, String>)
        -> SourcesResult<Vec<u8>>;
}

/// Blocking HTTP client moved off the runtime per request.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> SourcesResult<Vec<u8>> {
        debug!("Downloading {}", url);
        let url = url.to_string();
        let headers = headers.clone();
        tokio::task::spawn_blocking(move || -> SourcesResult<Vec<u8>> {
            let mut request = ureq::get(&url);
            for (name, value) in &headers {
                request = request.header(name, value);
            }
            let mut response = request
                .call()
                .map_err(|e| SourcesError::transport(&url, e.to_string()))?;
            response
                .body_mut()
                .with_config()
                // Release archives run to tens of megabytes; lift the
                // default body limit.
                .limit(512 * 1024 * 1024)
                .read_to_vec()
                .map_err(|e| SourcesError::transport(&url, e.to_string()))
        })
        .await
        .map_err(|e| SourcesError::Internal(format!("download task failed: {}", e)))?
    }
}
