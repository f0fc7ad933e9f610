//! External collaborators of the update pipeline
//!
//! Discovery, analysis and apply are ecosystem-specific and live outside
//! this crate. The pipeline only talks to them through these traits.

mod command;

pub use command::HelperCommand;

use crate::domain::{AnalysisResult, ApplyOutcome, ApplyRequest, DependencyInfo, DiscoveryResult};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Enumerates the projects and dependencies of a directory
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(
        &self,
        repo_root: &Path,
        directory: &str,
    ) -> Result<DiscoveryResult, CollaboratorError>;
}

/// Decides whether, and to what version, a dependency can be updated
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        repo_root: &Path,
        discovery: &DiscoveryResult,
        dependency: &DependencyInfo,
    ) -> Result<AnalysisResult, CollaboratorError>;
}

/// Rewrites a manifest to reflect a version change
#[async_trait]
pub trait Applier: Send + Sync {
    async fn apply(
        &self,
        repo_root: &Path,
        request: &ApplyRequest,
    ) -> Result<ApplyOutcome, CollaboratorError>;
}

#[async_trait]
impl<T: Discovery + ?Sized> Discovery for Arc<T> {
    async fn discover(
        &self,
        repo_root: &Path,
        directory: &str,
    ) -> Result<DiscoveryResult, CollaboratorError> {
        (**self).discover(repo_root, directory).await
    }
}

#[async_trait]
impl<T: Analyzer + ?Sized> Analyzer for Arc<T> {
    async fn analyze(
        &self,
        repo_root: &Path,
        discovery: &DiscoveryResult,
        dependency: &DependencyInfo,
    ) -> Result<AnalysisResult, CollaboratorError> {
        (**self).analyze(repo_root, discovery, dependency).await
    }
}

#[async_trait]
impl<T: Applier + ?Sized> Applier for Arc<T> {
    async fn apply(
        &self,
        repo_root: &Path,
        request: &ApplyRequest,
    ) -> Result<ApplyOutcome, CollaboratorError> {
        (**self).apply(repo_root, request).await
    }
}

/// The three collaborators a pipeline needs
pub struct Collaborators {
    pub discovery: Box<dyn Discovery>,
    pub analyzer: Box<dyn Analyzer>,
    pub applier: Box<dyn Applier>,
}

impl Collaborators {
    /// Bundle three collaborators
    pub fn new(
        discovery: Box<dyn Discovery>,
        analyzer: Box<dyn Analyzer>,
        applier: Box<dyn Applier>,
    ) -> Self {
        Self {
            discovery,
            analyzer,
            applier,
        }
    }

    /// Use one helper program for all three roles
    pub fn from_helper(helper: HelperCommand) -> Self {
        let helper = Arc::new(helper);
        Self::new(
            Box::new(helper.clone()),
            Box::new(helper.clone()),
            Box::new(helper),
        )
    }
}
