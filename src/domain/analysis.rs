//! Analysis requests and outcomes, plus the apply-step contract

use super::ErrorType;
use serde::{Deserialize, Serialize};

/// The unit submitted to analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub is_vulnerable: bool,
    #[serde(default)]
    pub ignored_versions: Vec<String>,
    #[serde(default)]
    pub vulnerabilities: Vec<SecurityVulnerability>,
}

impl DependencyInfo {
    /// Info for a dependency at a known version, with no advisories
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            is_vulnerable: false,
            ignored_versions: Vec::new(),
            vulnerabilities: Vec::new(),
        }
    }
}

/// A known vulnerability of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecurityVulnerability {
    pub dependency_name: String,
    #[serde(default)]
    pub vulnerable_versions: Vec<String>,
    #[serde(default)]
    pub safe_versions: Vec<String>,
}

/// A dependency touched by a candidate update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdatedDependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_url: Option<String>,
}

/// Outcome of asking whether a dependency can be updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisResult {
    pub can_update: bool,
    #[serde(default)]
    pub updated_version: String,
    #[serde(default)]
    pub updated_dependencies: Vec<UpdatedDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl AnalysisResult {
    /// An analysis that found a candidate
    pub fn updatable(version: impl Into<String>, updated: Vec<UpdatedDependency>) -> Self {
        Self {
            can_update: true,
            updated_version: version.into(),
            updated_dependencies: updated,
            error_type: None,
            error_details: None,
        }
    }

    /// An analysis that found nothing to do
    pub fn up_to_date(version: impl Into<String>) -> Self {
        Self {
            can_update: false,
            updated_version: version.into(),
            updated_dependencies: Vec::new(),
            error_type: None,
            error_details: None,
        }
    }

    /// Returns the error classification if analysis reported one
    pub fn error(&self) -> Option<ErrorType> {
        Some(ErrorType::from_option(self.error_type)).filter(|e| e.is_error())
    }

    /// Info URL of the named dependency among the candidates
    pub fn info_url_for(&self, name: &str) -> Option<&str> {
        self.updated_dependencies
            .iter()
            .find(|d| d.name == name)
            .and_then(|d| d.info_url.as_deref())
    }
}

/// One apply-step invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplyRequest {
    /// Canonical repository path of the file to rewrite
    pub file_path: String,
    pub dependency_name: String,
    pub previous_version: String,
    pub new_version: String,
    pub is_transitive: bool,
}

/// Result of the apply step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplyOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl ApplyOutcome {
    /// A successful apply
    pub fn success() -> Self {
        Self::default()
    }

    /// A failed apply
    pub fn failure(error_type: ErrorType, details: impl Into<String>) -> Self {
        Self {
            error_type: Some(error_type),
            error_details: Some(details.into()),
        }
    }

    /// Absent and `None` classifications both count as success
    pub fn is_success(&self) -> bool {
        !ErrorType::from_option(self.error_type).is_error()
    }
}
