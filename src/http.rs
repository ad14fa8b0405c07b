//! HTTP client for the activities endpoint.
//!
//! One GET per page, no retries. A 429 surfaces as [`RenderError::RateLimited`]
//! and is left to the caller.

use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};

use crate::activity::{ActivityRecord, ActivitySource, PageRequest};
use crate::config::RendererConfig;
use crate::error::{RenderError, Result};

/// Build `{endpoint}?access_token=..&page=..&per_page=..`.
pub fn activities_url(endpoint: &str, request: &PageRequest) -> Result<Url> {
    Url::parse_with_params(endpoint, request.query_pairs().iter().map(|(k, v)| (*k, v.as_str())))
        .map_err(|e| RenderError::InvalidArgument(format!("bad endpoint {:?}: {}", endpoint, e)))
}

/// Fetches activity pages over HTTPS.
#[derive(Debug, Clone)]
pub struct ActivityClient {
    client: Client,
    endpoint: String,
}

impl ActivityClient {
    /// Create a client for `config.endpoint`.
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self::with_client(builder.build()?, &config.endpoint))
    }

    /// Reuse an existing reqwest client.
    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self, request: &PageRequest) -> Result<Vec<ActivityRecord>> {
        request.validate()?;
        let url = activities_url(&self.endpoint, request)?;

        // The URL carries the token, so logs and errors only name the endpoint
        info!(
            "[ActivityClient] GET {} page={} per_page={}",
            self.endpoint, request.page, request.per_page
        );
        let start = Instant::now();

        let response = self.client.get(url).send().await?;
        let headers_elapsed = start.elapsed();
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("[ActivityClient] 429 Too Many Requests after {:?}", headers_elapsed);
            return Err(RenderError::RateLimited { url: self.endpoint.clone() });
        }
        if !status.is_success() {
            warn!("[ActivityClient] HTTP {} after {:?}", status, headers_elapsed);
            return Err(RenderError::HttpStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let bytes = response.bytes().await?;
        let body_elapsed = start.elapsed();

        let records: Vec<ActivityRecord> = serde_json::from_slice(&bytes)?;

        debug!(
            "[ActivityClient] headers={:?} body={:?}({:.1}KB)",
            headers_elapsed,
            body_elapsed,
            bytes.len() as f64 / 1024.0
        );
        info!(
            "[ActivityClient] received {} activities in {:?}",
            records.len(),
            start.elapsed()
        );

        Ok(records)
    }
}

impl ActivitySource for ActivityClient {
    fn fetch_page<'a>(&'a self, request: &'a PageRequest) -> BoxFuture<'a, Result<Vec<ActivityRecord>>> {
        Box::pin(self.fetch(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activities_url() {
        let url = activities_url(
            "https://www.strava.com/api/v3/athlete/activities",
            &PageRequest::first("abc123", 2),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.strava.com/api/v3/athlete/activities?access_token=abc123&page=1&per_page=2"
        );
    }

    #[test]
    fn test_activities_url_escapes_token() {
        let url = activities_url("http://localhost/activities", &PageRequest::first("a&b c", 1)).unwrap();
        assert_eq!(url.query(), Some("access_token=a%26b+c&page=1&per_page=1"));
    }

    #[test]
    fn test_activities_url_bad_endpoint() {
        let err = activities_url("not a url", &PageRequest::first("abc", 1)).unwrap_err();
        assert!(matches!(err, RenderError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_never_hits_network() {
        // Port 9 (discard) would fail to connect; validation must fail first
        let client = ActivityClient::new(&RendererConfig {
            endpoint: "http://127.0.0.1:9/activities".to_string(),
            ..Default::default()
        })
        .unwrap();
        let err = client.fetch_page(&PageRequest::first("", 5)).await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidArgument(_)));
    }
}
