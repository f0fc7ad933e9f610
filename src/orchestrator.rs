//! Update orchestrator for coordinating a whole run
//!
//! This module provides:
//! - Workflow coordination: enumerate directories → pipeline each → aggregate
//! - Strictly sequential processing in declaration order
//! - Progress display across directories
//! - The run report consumed by the summary output

use crate::aggregate::ResultAggregator;
use crate::api::ApiHandler;
use crate::collaborator::Collaborators;
use crate::config::RunnerConfig;
use crate::domain::{Job, RunResult};
use crate::error::AppError;
use crate::pipeline::{DirectoryPipeline, DirectoryReport, DirectoryStatus};
use crate::progress::Progress;
use crate::wire::WireFormat;
use std::path::Path;
use tracing::info;

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    /// Runner configuration
    config: RunnerConfig,
    /// Discovery, analysis and apply
    collaborators: Collaborators,
    /// Where every report goes
    api: Box<dyn ApiHandler>,
    /// Encoding for logged wire documents
    wire: WireFormat,
    /// Whether to draw progress bars
    show_progress: bool,
}

/// Result of running the orchestrator
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Aggregated output of every directory
    pub result: RunResult,
    /// One entry per processed directory, in processing order
    pub directories: Vec<DirectoryReport>,
}

impl RunReport {
    /// Total number of dependencies updated across directories
    pub fn total_updates(&self) -> usize {
        self.directories
            .iter()
            .map(|d| d.updated_dependencies.len())
            .sum()
    }

    /// Number of directories that ended with `status`
    pub fn count(&self, status: DirectoryStatus) -> usize {
        self.directories
            .iter()
            .filter(|d| d.status == status)
            .count()
    }

    /// Returns true if any directory could not be discovered
    pub fn has_failures(&self) -> bool {
        self.count(DirectoryStatus::DiscoveryFailed) > 0
    }
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        config: RunnerConfig,
        collaborators: Collaborators,
        api: Box<dyn ApiHandler>,
        wire: WireFormat,
    ) -> Self {
        Self {
            config,
            collaborators,
            api,
            wire,
            show_progress: false,
        }
    }

    /// Enable or disable progress display (builder pattern)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run every directory of `job` against the checkout at `repo_root`
    ///
    /// Directories run one after another; a later directory's file wins
    /// over an earlier one of the same name in the aggregated result.
    pub async fn run(
        &self,
        job: &Job,
        repo_root: &Path,
        base_commit_sha: &str,
    ) -> Result<RunReport, AppError> {
        let mut progress = Progress::new(self.show_progress);
        let pipeline = DirectoryPipeline::new(
            &self.config,
            &self.collaborators,
            self.api.as_ref(),
            repo_root,
            base_commit_sha,
            self.wire,
        );

        let directories = job.all_directories();
        let total = directories.len();
        let mut aggregator = ResultAggregator::new(base_commit_sha);
        let mut reports = Vec::with_capacity(total);

        for (index, directory) in directories.iter().enumerate() {
            progress.directory(directory, index + 1, total);
            info!(directory = %directory, "Processing directory");

            let outcome = pipeline.run(job, directory, &mut progress).await;
            progress.finish_and_clear();
            let outcome = outcome?;

            info!(
                directory = %directory,
                status = %outcome.report.status,
                updated = outcome.report.updated_dependencies.len(),
                "Finished directory"
            );
            aggregator.merge(outcome.result);
            reports.push(outcome.report);
        }

        Ok(RunReport {
            result: aggregator.finish(),
            directories: reports,
        })
    }
}
