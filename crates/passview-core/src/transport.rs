//! Fetching the encrypted export.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{PassviewError, Result};
use crate::locator::Location;

/// Request timeout for export downloads.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Binary-capable GET of the export blob.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns `PassviewError::Network` if the request fails or the response
    /// status is not a success; the message is the status text.
    async fn fetch(&self, location: &Location) -> Result<Vec<u8>>;
}

/// [`Fetcher`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("passview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PassviewError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &Location) -> Result<Vec<u8>> {
        // The URL and headers are derived from the passphrase; keep them out of logs.
        tracing::debug!(derived = location.is_derived(), "Fetching export");

        let mut request = self.client.get(&location.url);
        for (name, value) in &location.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| PassviewError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or(status.as_str());
            return Err(PassviewError::Network(status_text.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PassviewError::Network(e.without_url().to_string()))?;
        tracing::debug!(bytes = body.len(), "Export downloaded");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_is_network_error() {
        let fetcher = HttpFetcher::new().unwrap();
        let location = Location {
            url: "not a url".to_string(),
            headers: Vec::new(),
        };

        let result = fetcher.fetch(&location).await;
        assert!(matches!(result, Err(PassviewError::Network(_))));
    }
}
