//! Reporting API consumed by the pipeline
//!
//! This module provides:
//! - The `ApiHandler` trait the pipeline reports through
//! - HTTP handler posting to an update-job service, with retry logic
//! - Log-only handler for offline runs
//! - Recording handler that keeps every call for inspection

mod http;
mod recording;

pub use http::{ApiEndpoint, HttpApiHandler};
pub use recording::{ApiCall, RecordingApiHandler};

use crate::domain::{CreatePullRequest, IncrementMetric, MarkAsProcessed, UpdatedDependencyList};
use crate::error::ApiError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Trait for reporting API handlers
#[async_trait]
pub trait ApiHandler: Send + Sync {
    /// Report the current dependency list of a directory
    async fn update_dependency_list(&self, list: &UpdatedDependencyList) -> Result<(), ApiError>;

    /// Increment a named metric
    async fn increment_metric(&self, metric: &IncrementMetric) -> Result<(), ApiError>;

    /// Propose a change set
    async fn create_pull_request(&self, pull_request: &CreatePullRequest) -> Result<(), ApiError>;

    /// Signal that a directory has been processed
    async fn mark_as_processed(&self, processed: &MarkAsProcessed) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: ApiHandler + ?Sized> ApiHandler for Arc<T> {
    async fn update_dependency_list(&self, list: &UpdatedDependencyList) -> Result<(), ApiError> {
        (**self).update_dependency_list(list).await
    }

    async fn increment_metric(&self, metric: &IncrementMetric) -> Result<(), ApiError> {
        (**self).increment_metric(metric).await
    }

    async fn create_pull_request(&self, pull_request: &CreatePullRequest) -> Result<(), ApiError> {
        (**self).create_pull_request(pull_request).await
    }

    async fn mark_as_processed(&self, processed: &MarkAsProcessed) -> Result<(), ApiError> {
        (**self).mark_as_processed(processed).await
    }
}

/// Handler that only logs what would have been sent
#[derive(Debug, Default)]
pub struct LogApiHandler;

impl LogApiHandler {
    /// Create a new log handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ApiHandler for LogApiHandler {
    async fn update_dependency_list(&self, list: &UpdatedDependencyList) -> Result<(), ApiError> {
        info!(
            dependencies = list.dependencies.len(),
            files = list.dependency_files.len(),
            "update_dependency_list"
        );
        Ok(())
    }

    async fn increment_metric(&self, metric: &IncrementMetric) -> Result<(), ApiError> {
        info!(metric = %metric.metric, tags = ?metric.tags, "increment_metric");
        Ok(())
    }

    async fn create_pull_request(&self, pull_request: &CreatePullRequest) -> Result<(), ApiError> {
        info!(
            title = %pull_request.pr_title,
            files = pull_request.updated_dependency_files.len(),
            "create_pull_request"
        );
        Ok(())
    }

    async fn mark_as_processed(&self, processed: &MarkAsProcessed) -> Result<(), ApiError> {
        info!(base_commit_sha = %processed.base_commit_sha, "mark_as_processed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_handler_never_fails() {
        let handler = LogApiHandler::new();
        assert!(handler
            .update_dependency_list(&UpdatedDependencyList::default())
            .await
            .is_ok());
        assert!(handler
            .increment_metric(&IncrementMetric::new("updater.started"))
            .await
            .is_ok());
        assert!(handler
            .mark_as_processed(&MarkAsProcessed::new("abc"))
            .await
            .is_ok());
    }
}
