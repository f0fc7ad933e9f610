//! In-memory API handler that records every call in order

use super::ApiHandler;
use crate::domain::{CreatePullRequest, IncrementMetric, MarkAsProcessed, UpdatedDependencyList};
use crate::error::ApiError;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// One recorded API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    UpdateDependencyList(UpdatedDependencyList),
    IncrementMetric(IncrementMetric),
    CreatePullRequest(CreatePullRequest),
    MarkAsProcessed(MarkAsProcessed),
}

/// Handler that keeps every payload it receives
#[derive(Debug, Default)]
pub struct RecordingApiHandler {
    calls: Mutex<Vec<ApiCall>>,
}

impl RecordingApiHandler {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, in order
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    /// Recorded dependency lists
    pub async fn dependency_lists(&self) -> Vec<UpdatedDependencyList> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ApiCall::UpdateDependencyList(list) => Some(list.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded pull requests
    pub async fn pull_requests(&self) -> Vec<CreatePullRequest> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ApiCall::CreatePullRequest(pr) => Some(pr.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded metric increments
    pub async fn metrics(&self) -> Vec<IncrementMetric> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ApiCall::IncrementMetric(metric) => Some(metric.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of mark-as-processed notifications
    pub async fn processed_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, ApiCall::MarkAsProcessed(_)))
            .count()
    }

    async fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        self.calls.lock().await.push(call);
        Ok(())
    }
}

#[async_trait]
impl ApiHandler for RecordingApiHandler {
    async fn update_dependency_list(&self, list: &UpdatedDependencyList) -> Result<(), ApiError> {
        self.record(ApiCall::UpdateDependencyList(list.clone())).await
    }

    async fn increment_metric(&self, metric: &IncrementMetric) -> Result<(), ApiError> {
        self.record(ApiCall::IncrementMetric(metric.clone())).await
    }

    async fn create_pull_request(&self, pull_request: &CreatePullRequest) -> Result<(), ApiError> {
        self.record(ApiCall::CreatePullRequest(pull_request.clone()))
            .await
    }

    async fn mark_as_processed(&self, processed: &MarkAsProcessed) -> Result<(), ApiError> {
        self.record(ApiCall::MarkAsProcessed(processed.clone())).await
    }
}
