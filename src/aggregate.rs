//! Merging per-directory results into the run output

use crate::domain::{DependencyFile, RunResult};

/// Accumulates directory results in processing order
///
/// Files are keyed by name. A later directory's file replaces an earlier
/// one of the same name in place, so the output keeps first-seen order.
#[derive(Debug)]
pub struct ResultAggregator {
    base_commit_sha: String,
    files: Vec<DependencyFile>,
}

impl ResultAggregator {
    /// Create an aggregator for a run against `base_commit_sha`
    pub fn new(base_commit_sha: impl Into<String>) -> Self {
        Self {
            base_commit_sha: base_commit_sha.into(),
            files: Vec::new(),
        }
    }

    /// Merge one directory's contribution
    pub fn merge(&mut self, result: RunResult) {
        for file in result.base64_dependency_files {
            match self.files.iter_mut().find(|existing| existing.name == file.name) {
                Some(existing) => *existing = file,
                None => self.files.push(file),
            }
        }
    }

    /// Produce the final result, tagged with the run's base commit
    pub fn finish(self) -> RunResult {
        RunResult {
            base64_dependency_files: self.files,
            base_commit_sha: self.base_commit_sha,
        }
    }
}
