//! Core domain models for the update runner
//!
//! This module contains the types that flow through a run:
//! - Job description and its typed options
//! - Discovery snapshots of repository directories
//! - Analysis requests/outcomes and the apply contract
//! - Reporting payloads and the run output

mod analysis;
mod discovery;
mod job;
mod report;

pub use analysis::{
    AnalysisResult, ApplyOutcome, ApplyRequest, DependencyInfo, SecurityVulnerability,
    UpdatedDependency,
};
pub use discovery::{AuxiliaryFile, Dependency, DiscoveryResult, ErrorType, Project};
pub use job::{
    AllowedUpdate, CommitMessageOptions, CredentialMetadata, DependencyGroup, DependencyType,
    ExperimentValue, GroupPullRequest, GroupRules, IgnoreCondition, Job, JobFile, JobSource,
    PullRequestDependency, RequirementsUpdateStrategy, SecurityAdvisory, UpdateType,
    DEFAULT_DIRECTORY,
};
pub use report::{
    CreatePullRequest, DependencyFile, IncrementMetric, MarkAsProcessed, ReportedDependency,
    ReportedRequirement, RequirementSource, RunResult, UpdatedDependencyList, DEPENDENCIES_GROUP,
};
