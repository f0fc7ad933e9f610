//! HTTP reporting API handler
//!
//! Posts `{"data": payload}` to `{url}/update_jobs/{job_id}/{endpoint}` with:
//! - Configurable timeout and User-Agent
//! - Optional job token in the Authorization header
//! - Exponential backoff retry on rate limits, 5xx and transport errors

use super::ApiHandler;
use crate::config::ApiConfig;
use crate::domain::{CreatePullRequest, IncrementMetric, MarkAsProcessed, UpdatedDependencyList};
use crate::error::ApiError;
use crate::wire::WireFormat;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("update-runner/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// Reporting API endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEndpoint {
    UpdateDependencyList,
    IncrementMetric,
    CreatePullRequest,
    MarkAsProcessed,
}

impl ApiEndpoint {
    /// Path segment of the endpoint
    pub fn path(&self) -> &'static str {
        match self {
            ApiEndpoint::UpdateDependencyList => "update_dependency_list",
            ApiEndpoint::IncrementMetric => "increment_metric",
            ApiEndpoint::CreatePullRequest => "create_pull_request",
            ApiEndpoint::MarkAsProcessed => "mark_as_processed",
        }
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    data: &'a T,
}

/// Reporting API handler backed by reqwest
#[derive(Clone)]
pub struct HttpApiHandler {
    client: Client,
    base_url: String,
    job_id: String,
    token: Option<String>,
    max_retries: u32,
    wire: WireFormat,
}

impl HttpApiHandler {
    /// Create a handler for the configured update-job service
    pub fn new(
        config: &ApiConfig,
        job_id: impl Into<String>,
        base_url: impl Into<String>,
        wire: WireFormat,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| {
                ApiError::network_error("HTTP client", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            job_id: job_id.into(),
            token: config.token.clone(),
            max_retries: config.max_retries,
            wire,
        })
    }

    /// Full URL of an endpoint for this job
    pub fn endpoint_url(&self, endpoint: ApiEndpoint) -> String {
        format!(
            "{}/update_jobs/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.job_id,
            endpoint.path()
        )
    }

    /// POST a payload with retry logic
    async fn post<T: Serialize + Sync>(
        &self,
        endpoint: ApiEndpoint,
        payload: &T,
    ) -> Result<(), ApiError> {
        let body = self
            .wire
            .encode(&Envelope { data: payload })
            .map_err(|e| ApiError::EncodeError {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;
        let url = self.endpoint_url(endpoint);

        let mut delay = BASE_DELAY_MS;
        let mut attempt = 0;
        loop {
            match self.send_once(endpoint, &url, body.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    debug!(%endpoint, attempt, error = %e, "Retrying API call");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, endpoint: ApiEndpoint, url: &str, body: String) -> Result<(), ApiError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::timeout(endpoint.to_string())
            } else {
                ApiError::network_error(endpoint.to_string(), e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimitExceeded {
                endpoint: endpoint.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::StatusError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ApiHandler for HttpApiHandler {
    async fn update_dependency_list(&self, list: &UpdatedDependencyList) -> Result<(), ApiError> {
        self.post(ApiEndpoint::UpdateDependencyList, list).await
    }

    async fn increment_metric(&self, metric: &IncrementMetric) -> Result<(), ApiError> {
        self.post(ApiEndpoint::IncrementMetric, metric).await
    }

    async fn create_pull_request(&self, pull_request: &CreatePullRequest) -> Result<(), ApiError> {
        self.post(ApiEndpoint::CreatePullRequest, pull_request).await
    }

    async fn mark_as_processed(&self, processed: &MarkAsProcessed) -> Result<(), ApiError> {
        self.post(ApiEndpoint::MarkAsProcessed, processed).await
    }
}
