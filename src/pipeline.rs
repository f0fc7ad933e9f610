//! Per-directory update pipeline
//!
//! For one directory: discover → report snapshot → check eligibility →
//! capture originals → analyze and apply each candidate → diff → propose →
//! mark processed.
//!
//! Directory- and dependency-scoped failures are logged and absorbed here.
//! Only failures that would make the final report untruthful surface as
//! `AppError`.

use crate::api::ApiHandler;
use crate::collaborator::Collaborators;
use crate::config::RunnerConfig;
use crate::domain::{
    AnalysisResult, ApplyRequest, CreatePullRequest, Dependency, DependencyFile, DependencyInfo,
    DiscoveryResult, IncrementMetric, Job, MarkAsProcessed, ReportedDependency,
    ReportedRequirement, RequirementSource, RunResult, UpdatedDependencyList,
};
use crate::error::{ApiError, AppError, IoError};
use crate::path::{canonical_repo_path, local_path, split_repo_path};
use crate::progress::Progress;
use crate::pull_request;
use crate::snapshot::build_dependency_list;
use crate::wire::WireFormat;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, enabled, info, warn, Level};

/// Metric incremented when an eligible directory starts updating
pub const STARTED_METRIC: &str = "updater.started";

/// Operation tag value for full, non-targeted updates
pub const FULL_UPDATE_OPERATION: &str = "group_update_all_versions";

/// How a directory ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStatus {
    /// At least one file changed and a pull request was proposed
    Updated,
    /// Updates were attempted but no file changed
    NoChanges,
    /// The job does not allow full updates
    NotEligible,
    /// Discovery failed or reported an error
    DiscoveryFailed,
}

impl DirectoryStatus {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            DirectoryStatus::Updated => "updated",
            DirectoryStatus::NoChanges => "no changes",
            DirectoryStatus::NotEligible => "not eligible",
            DirectoryStatus::DiscoveryFailed => "discovery failed",
        }
    }
}

impl fmt::Display for DirectoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What happened in one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReport {
    pub directory: String,
    pub status: DirectoryStatus,
    /// Applied dependencies whose requirement file changed on disk
    pub updated_dependencies: Vec<ReportedDependency>,
    /// Canonical paths of files whose content changed
    pub changed_files: Vec<String>,
    /// Why discovery failed, if it did
    pub error: Option<String>,
}

impl DirectoryReport {
    fn new(directory: &str, status: DirectoryStatus) -> Self {
        Self {
            directory: directory.to_string(),
            status,
            updated_dependencies: Vec::new(),
            changed_files: Vec::new(),
            error: None,
        }
    }

    fn failed(directory: &str, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(directory, DirectoryStatus::DiscoveryFailed)
        }
    }
}

/// A directory's report plus its contribution to the run output
#[derive(Debug, Clone)]
pub struct DirectoryOutcome {
    pub report: DirectoryReport,
    pub result: RunResult,
}

/// Content of a project file before any update ran
#[derive(Debug)]
struct OriginalFile {
    /// Path relative to the discovery directory
    relative: String,
    content: Vec<u8>,
}

/// A direct dependency eligible for analysis
struct Candidate<'d> {
    file: String,
    dependency: &'d Dependency,
    version: &'d str,
}

/// Runs the update workflow for single directories
pub struct DirectoryPipeline<'a> {
    config: &'a RunnerConfig,
    collaborators: &'a Collaborators,
    api: &'a dyn ApiHandler,
    repo_root: &'a Path,
    base_commit_sha: &'a str,
    wire: WireFormat,
}

impl<'a> DirectoryPipeline<'a> {
    /// Create a pipeline for a run against `base_commit_sha`
    pub fn new(
        config: &'a RunnerConfig,
        collaborators: &'a Collaborators,
        api: &'a dyn ApiHandler,
        repo_root: &'a Path,
        base_commit_sha: &'a str,
        wire: WireFormat,
    ) -> Self {
        Self {
            config,
            collaborators,
            api,
            repo_root,
            base_commit_sha,
            wire,
        }
    }

    /// Process one directory
    pub async fn run(
        &self,
        job: &Job,
        directory: &str,
        progress: &mut Progress,
    ) -> Result<DirectoryOutcome, AppError> {
        let discovery = match self
            .collaborators
            .discovery
            .discover(self.repo_root, directory)
            .await
        {
            Ok(discovery) => discovery,
            Err(e) => {
                warn!(directory, error = %e, "Discovery failed, skipping directory");
                self.mark_as_processed().await;
                return Ok(self.outcome(DirectoryReport::failed(directory, e.to_string())));
            }
        };

        self.log_discovery(directory, &discovery);

        let dependency_list = build_dependency_list(&discovery);
        debug!(
            directory,
            dependencies = dependency_list.dependencies.len(),
            files = dependency_list.dependency_files.len(),
            "Reporting dependency list"
        );
        report_failure(
            "update_dependency_list",
            self.api.update_dependency_list(&dependency_list).await,
        );

        if let Some(error_type) = discovery.error() {
            let details = discovery.error_details.as_deref().unwrap_or_default();
            warn!(directory, %error_type, details, "Discovery reported an error, skipping updates");
            self.mark_as_processed().await;
            let message = if details.is_empty() {
                error_type.to_string()
            } else {
                format!("{}: {}", error_type, details)
            };
            return Ok(self.outcome(DirectoryReport::failed(directory, message)));
        }

        if !job.allows_full_update() {
            info!(directory, "Job does not allow full updates, nothing to do");
            self.mark_as_processed().await;
            return Ok(self.outcome(DirectoryReport::new(directory, DirectoryStatus::NotEligible)));
        }

        let metric = IncrementMetric::new(STARTED_METRIC).with_tag("operation", FULL_UPDATE_OPERATION);
        report_failure("increment_metric", self.api.increment_metric(&metric).await);

        let originals = self.capture_originals(&discovery).await?;
        let updated = self
            .update_dependencies(&discovery, &dependency_list, progress)
            .await?;
        let (changed_paths, changed_files) = self.changed_files(&discovery, &originals).await?;

        let status = if changed_files.is_empty() {
            info!(directory, "No files changed");
            DirectoryStatus::NoChanges
        } else {
            let text = pull_request::describe(&discovery.path, &updated);
            info!(
                directory,
                files = changed_files.len(),
                dependencies = updated.len(),
                title = %text.title,
                "Proposing pull request"
            );
            let pull_request = CreatePullRequest {
                dependencies: updated.clone(),
                updated_dependency_files: changed_files,
                base_commit_sha: self.base_commit_sha.to_string(),
                commit_message: text.commit_message,
                pr_title: text.title,
                pr_body: text.body,
            };
            report_failure(
                "create_pull_request",
                self.api.create_pull_request(&pull_request).await,
            );
            DirectoryStatus::Updated
        };

        self.mark_as_processed().await;

        let confirmed = confirmed_updates(&updated, &changed_paths);
        Ok(DirectoryOutcome {
            report: DirectoryReport {
                updated_dependencies: confirmed,
                changed_files: changed_paths,
                ..DirectoryReport::new(directory, status)
            },
            result: self.run_result(&originals),
        })
    }

    fn outcome(&self, report: DirectoryReport) -> DirectoryOutcome {
        DirectoryOutcome {
            report,
            result: RunResult::empty(self.base_commit_sha),
        }
    }

    fn log_discovery(&self, directory: &str, discovery: &DiscoveryResult) {
        if !enabled!(Level::DEBUG) {
            return;
        }
        match self.wire.encode(discovery) {
            Ok(json) => debug!(directory, discovery = %json, "Discovery finished"),
            Err(e) => debug!(directory, error = %e, "Could not encode discovery result"),
        }
    }

    async fn mark_as_processed(&self) {
        report_failure(
            "mark_as_processed",
            self.api
                .mark_as_processed(&MarkAsProcessed::new(self.base_commit_sha))
                .await,
        );
    }

    /// Read every project file before anything is applied
    async fn capture_originals(
        &self,
        discovery: &DiscoveryResult,
    ) -> Result<BTreeMap<String, OriginalFile>, IoError> {
        let mut originals = BTreeMap::new();
        for project in &discovery.projects {
            let canonical = canonical_repo_path(Some(discovery.path.as_str()), &project.file_path);
            if originals.contains_key(&canonical) {
                continue;
            }
            let path = local_path(self.repo_root, &canonical);
            let content = tokio::fs::read(&path)
                .await
                .map_err(|e| IoError::read_error(&path, e))?;
            originals.insert(
                canonical,
                OriginalFile {
                    relative: project.file_path.clone(),
                    content,
                },
            );
        }
        Ok(originals)
    }

    /// Direct dependencies with a known version, toolchain excluded
    fn candidates<'d>(&self, discovery: &'d DiscoveryResult) -> Vec<Candidate<'d>> {
        let config = self.config;
        discovery
            .projects
            .iter()
            .flat_map(move |project| {
                let file = canonical_repo_path(Some(discovery.path.as_str()), &project.file_path);
                project
                    .dependencies
                    .iter()
                    .filter(|d| !d.is_transitive && !d.name.is_empty())
                    .filter(move |d| !config.is_toolchain_dependency(&d.name))
                    .filter_map(move |dependency| {
                        let version = dependency.version.as_deref()?;
                        Some(Candidate {
                            file: file.clone(),
                            dependency,
                            version,
                        })
                    })
            })
            .collect()
    }

    async fn update_dependencies(
        &self,
        discovery: &DiscoveryResult,
        dependency_list: &UpdatedDependencyList,
        progress: &mut Progress,
    ) -> Result<Vec<ReportedDependency>, AppError> {
        let candidates = self.candidates(discovery);
        progress.dependencies(candidates.len());

        let mut updated = Vec::new();
        for candidate in &candidates {
            progress.dependency(&candidate.dependency.name);
            if let Some(dependency) = self
                .update_dependency(discovery, dependency_list, candidate)
                .await?
            {
                updated.push(dependency);
            }
            progress.inc();
        }
        progress.finish_and_clear();
        Ok(updated)
    }

    /// Analyze one candidate and apply it if updatable
    ///
    /// Returns the updated dependency only when the apply step succeeded.
    async fn update_dependency(
        &self,
        discovery: &DiscoveryResult,
        dependency_list: &UpdatedDependencyList,
        candidate: &Candidate<'_>,
    ) -> Result<Option<ReportedDependency>, AppError> {
        let name = candidate.dependency.name.as_str();
        let info = DependencyInfo::new(name, candidate.version);

        let analysis = match self
            .collaborators
            .analyzer
            .analyze(self.repo_root, discovery, &info)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(dependency = name, error = %e, "Analysis failed, skipping dependency");
                return Ok(None);
            }
        };
        if let Some(error_type) = analysis.error() {
            warn!(dependency = name, %error_type, "Analysis reported an error, skipping dependency");
            return Ok(None);
        }
        if !analysis.can_update {
            debug!(dependency = name, version = candidate.version, "No update available");
            return Ok(None);
        }

        let prior = dependency_list
            .find_declared(name, &candidate.file)
            .ok_or_else(|| AppError::MissingReportedDependency {
                name: name.to_string(),
                file: candidate.file.clone(),
            })?;
        let updated = updated_dependency(prior, &candidate.file, &analysis);

        let request = ApplyRequest {
            file_path: candidate.file.clone(),
            dependency_name: name.to_string(),
            previous_version: candidate.version.to_string(),
            new_version: analysis.updated_version.clone(),
            is_transitive: candidate.dependency.is_transitive,
        };
        match self
            .collaborators
            .applier
            .apply(self.repo_root, &request)
            .await
        {
            Ok(outcome) if outcome.is_success() => {
                info!(
                    dependency = name,
                    from = candidate.version,
                    to = %analysis.updated_version,
                    file = %candidate.file,
                    "Updated dependency"
                );
                Ok(Some(updated))
            }
            Ok(outcome) => {
                warn!(
                    dependency = name,
                    error_type = %outcome.error_type.unwrap_or_default(),
                    details = outcome.error_details.as_deref().unwrap_or_default(),
                    "Update was not applied"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(dependency = name, error = %e, "Update failed");
                Ok(None)
            }
        }
    }

    /// Re-read every captured file and keep the ones that differ
    async fn changed_files(
        &self,
        discovery: &DiscoveryResult,
        originals: &BTreeMap<String, OriginalFile>,
    ) -> Result<(Vec<String>, Vec<DependencyFile>), IoError> {
        let mut paths = Vec::new();
        let mut files = Vec::new();
        for (canonical, original) in originals {
            let path = local_path(self.repo_root, canonical);
            let current = tokio::fs::read(&path)
                .await
                .map_err(|e| IoError::read_error(&path, e))?;
            if current != original.content {
                debug!(file = %canonical, "File changed");
                paths.push(canonical.clone());
                files.push(DependencyFile {
                    name: original.relative.clone(),
                    content: String::from_utf8_lossy(&current).into_owned(),
                    directory: discovery.path.clone(),
                });
            }
        }
        Ok((paths, files))
    }

    /// The directory's run output, built from pre-update content
    fn run_result(&self, originals: &BTreeMap<String, OriginalFile>) -> RunResult {
        let base64_dependency_files = originals
            .iter()
            .map(|(canonical, original)| {
                let (directory, name) = split_repo_path(canonical);
                DependencyFile {
                    name,
                    content: STANDARD.encode(&original.content),
                    directory,
                }
            })
            .collect();
        RunResult {
            base64_dependency_files,
            base_commit_sha: self.base_commit_sha.to_string(),
        }
    }
}

/// The reported state of `prior` after moving to the analyzed version
///
/// Group tags are carried over from the requirement in `file`; the new
/// requirement's source is the analysis's info URL for the dependency.
pub fn updated_dependency(
    prior: &ReportedDependency,
    file: &str,
    analysis: &AnalysisResult,
) -> ReportedDependency {
    let groups = prior
        .requirement_in(file)
        .map(|r| r.groups.clone())
        .unwrap_or_default();
    let source = RequirementSource {
        source_url: analysis.info_url_for(&prior.name).map(str::to_string),
    };

    ReportedDependency {
        name: prior.name.clone(),
        version: Some(analysis.updated_version.clone()),
        requirements: vec![ReportedRequirement {
            file: file.to_string(),
            requirement: analysis.updated_version.clone(),
            groups,
            source: Some(source),
        }],
        previous_version: prior.version.clone(),
        previous_requirements: Some(prior.requirements.clone()),
    }
}

/// Updates whose requirement file is among `changed_paths`
///
/// An apply step can succeed without touching disk; those updates are not
/// reported to the user.
pub fn confirmed_updates(
    updated: &[ReportedDependency],
    changed_paths: &[String],
) -> Vec<ReportedDependency> {
    updated
        .iter()
        .filter(|dependency| {
            dependency
                .requirements
                .iter()
                .any(|r| changed_paths.contains(&r.file))
        })
        .cloned()
        .collect()
}

/// Reporting calls never change control flow
fn report_failure(call: &str, result: Result<(), ApiError>) {
    if let Err(e) = result {
        warn!(call, error = %e, "Reporting API call failed");
    }
}
