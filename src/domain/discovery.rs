//! Discovery snapshot of one repository directory

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error classification reported by a collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    #[default]
    None,
    AuthenticationFailure,
    DependencyFileNotFound,
    MissingFile,
    UpdateNotPossible,
    /// Any classification this updater does not know
    #[serde(other)]
    Unknown,
}

impl ErrorType {
    /// Returns true for every classification other than `None`
    pub fn is_error(self) -> bool {
        self != ErrorType::None
    }

    /// Collapse an optional classification, absent meaning `None`
    pub fn from_option(error_type: Option<ErrorType>) -> Self {
        error_type.unwrap_or_default()
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorType::None => "None",
            ErrorType::AuthenticationFailure => "AuthenticationFailure",
            ErrorType::DependencyFileNotFound => "DependencyFileNotFound",
            ErrorType::MissingFile => "MissingFile",
            ErrorType::UpdateNotPossible => "UpdateNotPossible",
            ErrorType::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// A dependency declared or resolved by a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dependency {
    pub name: String,
    /// Resolved version, absent when discovery could not determine it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub is_transitive: bool,
}

impl Dependency {
    /// A directly declared dependency
    pub fn direct(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            is_transitive: false,
        }
    }

    /// A dependency pulled in indirectly
    pub fn transitive(name: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            is_transitive: true,
        }
    }
}

/// A project file and its dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    /// Path relative to the discovery path
    pub file_path: String,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Project {
    /// Creates a new project
    pub fn new(file_path: impl Into<String>, dependencies: Vec<Dependency>) -> Self {
        Self {
            file_path: file_path.into(),
            dependencies,
        }
    }
}

/// An auxiliary manifest found next to the projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuxiliaryFile {
    /// Path relative to the discovery path
    pub file_path: String,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl AuxiliaryFile {
    /// Creates a new auxiliary file entry without dependencies
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            dependencies: Vec::new(),
        }
    }
}

/// Snapshot of one directory produced by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveryResult {
    /// Repository-relative directory the snapshot describes
    pub path: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Global toolchain configuration (e.g. SDK pinning file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_config: Option<AuxiliaryFile>,
    /// Local tool manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_manifest: Option<AuxiliaryFile>,
    /// Centrally managed package versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central_package_versions: Option<AuxiliaryFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl DiscoveryResult {
    /// Creates a successful discovery result
    pub fn new(path: impl Into<String>, projects: Vec<Project>) -> Self {
        Self {
            path: path.into(),
            projects,
            global_config: None,
            tool_manifest: None,
            central_package_versions: None,
            error_type: None,
            error_details: None,
        }
    }

    /// Returns the error classification if discovery reported one
    pub fn error(&self) -> Option<ErrorType> {
        Some(ErrorType::from_option(self.error_type)).filter(|e| e.is_error())
    }

    /// Auxiliary manifests that are present, in reporting order
    pub fn auxiliary_files(&self) -> impl Iterator<Item = &AuxiliaryFile> {
        [
            self.global_config.as_ref(),
            self.tool_manifest.as_ref(),
            self.central_package_versions.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_is_error() {
        assert!(!ErrorType::None.is_error());
        assert!(ErrorType::MissingFile.is_error());
        assert!(!ErrorType::from_option(None).is_error());
    }

    #[test]
    fn test_error_type_wire_names() {
        let json = serde_json::to_string(&ErrorType::AuthenticationFailure).unwrap();
        assert_eq!(json, r#""AuthenticationFailure""#);
        let parsed: ErrorType = serde_json::from_str(r#""SomethingElse""#).unwrap();
        assert_eq!(parsed, ErrorType::Unknown);
    }

    #[test]
    fn test_discovery_error() {
        let mut discovery = DiscoveryResult::new("/src", Vec::new());
        assert_eq!(discovery.error(), None);

        discovery.error_type = Some(ErrorType::None);
        assert_eq!(discovery.error(), None);

        discovery.error_type = Some(ErrorType::DependencyFileNotFound);
        assert_eq!(discovery.error(), Some(ErrorType::DependencyFileNotFound));
    }

    #[test]
    fn test_auxiliary_files_order() {
        let mut discovery = DiscoveryResult::new("/", Vec::new());
        discovery.central_package_versions = Some(AuxiliaryFile::new("Directory.Packages.props"));
        discovery.global_config = Some(AuxiliaryFile::new("global.json"));

        let names: Vec<&str> = discovery
            .auxiliary_files()
            .map(|f| f.file_path.as_str())
            .collect();
        assert_eq!(names, vec!["global.json", "Directory.Packages.props"]);
    }

    #[test]
    fn test_deserialize_discovery() {
        let json = r#"{
            "path": "/src",
            "projects": [{
                "file-path": "app/app.csproj",
                "dependencies": [
                    {"name": "Some.Package", "version": "1.0.0"},
                    {"name": "Transitive.Package", "version": "2.0.0", "is-transitive": true},
                    {"name": "Unknown.Version"}
                ]
            }],
            "tool-manifest": {"file-path": ".config/dotnet-tools.json"}
        }"#;
        let discovery: DiscoveryResult = serde_json::from_str(json).unwrap();
        assert_eq!(discovery.projects.len(), 1);
        let deps = &discovery.projects[0].dependencies;
        assert!(!deps[0].is_transitive);
        assert!(deps[1].is_transitive);
        assert_eq!(deps[2].version, None);
        assert!(discovery.tool_manifest.is_some());
    }
}
