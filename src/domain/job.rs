//! Job description consumed by a run
//!
//! Every option of the job wire format is enumerated here. Fields this
//! crate does not interpret (advisories, ignore conditions, groups, commit
//! options, credentials) are still typed so they decode strictly and can be
//! forwarded verbatim.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directory processed when a job names none
pub const DEFAULT_DIRECTORY: &str = "/";

/// Wrapper object around a job, as found in job files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobFile {
    pub job: Job,
}

/// Immutable configuration for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    /// Ecosystem identifier, must match the running updater
    pub package_manager: String,
    /// Repository location and target directories
    pub source: JobSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_updates: Option<Vec<AllowedUpdate>>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_groups: Option<Vec<DependencyGroup>>,
    /// Dependency names targeted by this job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_group_to_refresh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_pull_requests: Option<Vec<Vec<PullRequestDependency>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_group_pull_requests: Option<Vec<GroupPullRequest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiments: Option<BTreeMap<String, ExperimentValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_conditions: Option<Vec<IgnoreCondition>>,
    #[serde(default)]
    pub lockfile_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_update_strategy: Option<RequirementsUpdateStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_advisories: Option<Vec<SecurityAdvisory>>,
    #[serde(default)]
    pub security_updates_only: bool,
    #[serde(default)]
    pub update_subdependencies: bool,
    #[serde(default)]
    pub updating_a_pull_request: bool,
    #[serde(default)]
    pub vendor_dependencies: bool,
    #[serde(default)]
    pub reject_external_code: bool,
    #[serde(default)]
    pub repo_private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_options: Option<CommitMessageOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_metadata: Option<Vec<CredentialMetadata>>,
    /// Time budget for the whole run in seconds, 0 means unlimited
    #[serde(default)]
    pub max_updater_run_time: u64,
}

impl Job {
    /// Create a job with every optional field at its default
    pub fn new(package_manager: impl Into<String>, source: JobSource) -> Self {
        Self {
            package_manager: package_manager.into(),
            source,
            allowed_updates: None,
            debug: false,
            dependency_groups: None,
            dependencies: None,
            dependency_group_to_refresh: None,
            existing_pull_requests: None,
            existing_group_pull_requests: None,
            experiments: None,
            ignore_conditions: None,
            lockfile_only: false,
            requirements_update_strategy: None,
            security_advisories: None,
            security_updates_only: false,
            update_subdependencies: false,
            updating_a_pull_request: false,
            vendor_dependencies: false,
            reject_external_code: false,
            repo_private: false,
            commit_message_options: None,
            credentials_metadata: None,
            max_updater_run_time: 0,
        }
    }

    /// Sets the allowed updates (builder pattern)
    pub fn with_allowed_updates(mut self, allowed: Vec<AllowedUpdate>) -> Self {
        self.allowed_updates = Some(allowed);
        self
    }

    /// Ordered directories to process
    ///
    /// `source.directory` first, then every `source.directories` entry in
    /// list order, duplicates kept. Falls back to `/` when neither yields
    /// anything, so a job always maps to at least one directory.
    pub fn all_directories(&self) -> Vec<String> {
        let mut directories = Vec::new();
        if let Some(directory) = &self.source.directory {
            directories.push(directory.clone());
        }
        if let Some(list) = &self.source.directories {
            directories.extend(list.iter().cloned());
        }
        if directories.is_empty() {
            directories.push(DEFAULT_DIRECTORY.to_string());
        }
        directories
    }

    /// Returns true if the job asks for a full, non-targeted update
    pub fn allows_full_update(&self) -> bool {
        self.allowed_updates
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|allowed| allowed.update_type == UpdateType::All)
    }
}

/// Repository location of a job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

impl JobSource {
    /// Source with a single directory
    pub fn with_directory(directory: impl Into<String>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }

    /// Source with a list of directories
    pub fn with_directories(directories: Vec<String>) -> Self {
        Self {
            directories: Some(directories),
            ..Self::default()
        }
    }
}

/// One entry of `allowed-updates`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AllowedUpdate {
    #[serde(default)]
    pub dependency_type: DependencyType,
    #[serde(default)]
    pub update_type: UpdateType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_name: Option<String>,
}

impl AllowedUpdate {
    /// Allow every update of every dependency
    pub fn all() -> Self {
        Self {
            dependency_type: DependencyType::All,
            update_type: UpdateType::All,
            dependency_name: None,
        }
    }

    /// Allow only security updates
    pub fn security() -> Self {
        Self {
            dependency_type: DependencyType::All,
            update_type: UpdateType::Security,
            dependency_name: None,
        }
    }
}

/// Which dependencies an allowed update applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    #[default]
    All,
    Direct,
    Indirect,
    Production,
    Development,
}

/// Kind of update an allowed update permits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateType {
    #[default]
    All,
    Security,
    /// Any value this updater does not know
    #[serde(other)]
    Unknown,
}

/// How manifests should express a new requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementsUpdateStrategy {
    BumpVersions,
    BumpVersionsIfNecessary,
    LockfileOnly,
    WidenRanges,
}

/// A dependency group definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<String>,
    #[serde(default)]
    pub rules: GroupRules,
}

/// Membership rules of a dependency group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<DependencyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_types: Option<Vec<String>>,
}

/// A dependency covered by an already open pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PullRequestDependency {
    pub dependency_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default)]
    pub dependency_removed: bool,
}

/// An already open grouped pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupPullRequest {
    pub dependency_group_name: String,
    #[serde(default)]
    pub dependencies: Vec<PullRequestDependency>,
}

/// Experiment flag value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperimentValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

/// A version range the job asks to ignore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IgnoreCondition {
    pub dependency_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_requirement: Option<String>,
}

/// Security advisory attached to a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecurityAdvisory {
    pub dependency_name: String,
    #[serde(default)]
    pub affected_versions: Vec<String>,
    #[serde(default)]
    pub patched_versions: Vec<String>,
    #[serde(default)]
    pub unaffected_versions: Vec<String>,
}

/// Commit message customisation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommitMessageOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_development: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_scope: Option<bool>,
}

/// Non-secret description of a registry credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CredentialMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces_base: Option<bool>,
}
