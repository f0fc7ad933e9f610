//! Payloads sent to the reporting API and the run output

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group tag attached to every directly declared requirement
pub const DEPENDENCIES_GROUP: &str = "dependencies";

/// Where an updated requirement comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequirementSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// One requirement of one dependency in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportedRequirement {
    /// Canonical repository path of the declaring file
    pub file: String,
    /// Literal requirement string
    pub requirement: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RequirementSource>,
}

/// Current or updated state of one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportedDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub requirements: Vec<ReportedRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_requirements: Option<Vec<ReportedRequirement>>,
}

impl ReportedDependency {
    /// Returns the requirement recorded for `file`, if any
    pub fn requirement_in(&self, file: &str) -> Option<&ReportedRequirement> {
        self.requirements.iter().find(|r| r.file == file)
    }
}

/// The current dependency list of one directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdatedDependencyList {
    pub dependencies: Vec<ReportedDependency>,
    /// Canonical paths of every dependency file in scope
    pub dependency_files: Vec<String>,
}

impl UpdatedDependencyList {
    /// Find the reported dependency that declares `name` in `file`
    pub fn find_declared(&self, name: &str, file: &str) -> Option<&ReportedDependency> {
        self.dependencies
            .iter()
            .find(|d| d.name == name && d.requirement_in(file).is_some())
    }
}

/// A file's content plus its name and directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyFile {
    pub name: String,
    pub content: String,
    pub directory: String,
}

/// Payload of a pull-request proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreatePullRequest {
    pub dependencies: Vec<ReportedDependency>,
    pub updated_dependency_files: Vec<DependencyFile>,
    pub base_commit_sha: String,
    pub commit_message: String,
    pub pr_title: String,
    pub pr_body: String,
}

/// Notification that a directory has been processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MarkAsProcessed {
    pub base_commit_sha: String,
}

impl MarkAsProcessed {
    /// Creates a new notification
    pub fn new(base_commit_sha: impl Into<String>) -> Self {
        Self {
            base_commit_sha: base_commit_sha.into(),
        }
    }
}

/// A metric increment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IncrementMetric {
    pub metric: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl IncrementMetric {
    /// Creates a metric without tags
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Adds a tag (builder pattern)
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Terminal artifact of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunResult {
    /// Files with base64-encoded content
    pub base64_dependency_files: Vec<DependencyFile>,
    pub base_commit_sha: String,
}

impl RunResult {
    /// A result with no files
    pub fn empty(base_commit_sha: impl Into<String>) -> Self {
        Self {
            base64_dependency_files: Vec::new(),
            base_commit_sha: base_commit_sha.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(file: &str) -> ReportedRequirement {
        ReportedRequirement {
            file: file.to_string(),
            requirement: "1.0.0".to_string(),
            groups: vec![DEPENDENCIES_GROUP.to_string()],
            source: None,
        }
    }

    #[test]
    fn test_find_declared() {
        let list = UpdatedDependencyList {
            dependencies: vec![
                ReportedDependency {
                    name: "Some.Package".to_string(),
                    version: Some("1.0.0".to_string()),
                    requirements: Vec::new(),
                    previous_version: None,
                    previous_requirements: None,
                },
                ReportedDependency {
                    name: "Some.Package".to_string(),
                    version: Some("1.0.0".to_string()),
                    requirements: vec![requirement("/b.csproj")],
                    previous_version: None,
                    previous_requirements: None,
                },
            ],
            dependency_files: vec!["/b.csproj".to_string()],
        };

        let found = list.find_declared("Some.Package", "/b.csproj").unwrap();
        assert_eq!(found.requirements.len(), 1);
        assert!(list.find_declared("Some.Package", "/a.csproj").is_none());
        assert!(list.find_declared("Other", "/b.csproj").is_none());
    }

    #[test]
    fn test_run_result_wire_names() {
        let result = RunResult {
            base64_dependency_files: vec![DependencyFile {
                name: "a.csproj".to_string(),
                content: "PFByb2plY3Q+".to_string(),
                directory: "/src".to_string(),
            }],
            base_commit_sha: "abc123".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["base-commit-sha"], "abc123");
        assert_eq!(json["base64-dependency-files"][0]["directory"], "/src");
    }

    #[test]
    fn test_reported_dependency_skips_empty_optionals() {
        let dep = ReportedDependency {
            name: "Some.Package".to_string(),
            version: Some("1.0.0".to_string()),
            requirements: vec![requirement("/a.csproj")],
            previous_version: None,
            previous_requirements: None,
        };
        let json = serde_json::to_value(&dep).unwrap();
        assert!(json.get("previous-version").is_none());
        assert!(json["requirements"][0].get("source").is_none());
    }

    #[test]
    fn test_increment_metric_tags() {
        let metric = IncrementMetric::new("updater.started").with_tag("operation", "x");
        assert_eq!(metric.tags.get("operation").map(String::as_str), Some("x"));
    }
}
