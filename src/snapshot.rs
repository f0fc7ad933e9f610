//! Current dependency list built from a discovery snapshot
//!
//! Reported before any update is attempted so the caller always sees the
//! state of a directory, even when nothing ends up changing.

use crate::domain::{
    DiscoveryResult, ReportedDependency, ReportedRequirement, UpdatedDependencyList,
    DEPENDENCIES_GROUP,
};
use crate::path::canonical_repo_path;

/// Build the wire-level dependency list for one directory
///
/// Dependencies without a known version are left out. Direct dependencies
/// carry exactly one requirement naming their canonical file; transitive
/// ones are listed with no requirements.
pub fn build_dependency_list(discovery: &DiscoveryResult) -> UpdatedDependencyList {
    let base = Some(discovery.path.as_str());

    let dependencies = discovery
        .projects
        .iter()
        .flat_map(|project| {
            let file = canonical_repo_path(base, &project.file_path);
            project.dependencies.iter().filter_map(move |dependency| {
                let version = dependency.version.as_ref()?;
                let requirements = if dependency.is_transitive {
                    Vec::new()
                } else {
                    vec![ReportedRequirement {
                        file: file.clone(),
                        requirement: version.clone(),
                        groups: vec![DEPENDENCIES_GROUP.to_string()],
                        source: None,
                    }]
                };
                Some(ReportedDependency {
                    name: dependency.name.clone(),
                    version: Some(version.clone()),
                    requirements,
                    previous_version: None,
                    previous_requirements: None,
                })
            })
        })
        .collect();

    let dependency_files = discovery
        .projects
        .iter()
        .map(|project| project.file_path.as_str())
        .chain(discovery.auxiliary_files().map(|f| f.file_path.as_str()))
        .map(|file_path| canonical_repo_path(base, file_path))
        .collect();

    UpdatedDependencyList {
        dependencies,
        dependency_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuxiliaryFile, Dependency, Project};

    fn sample_discovery() -> DiscoveryResult {
        let mut discovery = DiscoveryResult::new(
            "src",
            vec![
                Project::new(
                    "app\\app.csproj",
                    vec![
                        Dependency::direct("Some.Package", Some("1.0.0")),
                        Dependency::transitive("Transitive.Package", Some("2.0.0")),
                        Dependency::direct("No.Version", None),
                    ],
                ),
                Project::new("lib/lib.csproj", vec![Dependency::direct("Other", Some("3.1.0"))]),
            ],
        );
        discovery.global_config = Some(AuxiliaryFile::new("global.json"));
        discovery.tool_manifest = Some(AuxiliaryFile::new(".config\\dotnet-tools.json"));
        discovery.central_package_versions = Some(AuxiliaryFile::new("Directory.Packages.props"));
        discovery
    }

    #[test]
    fn test_direct_dependency_has_one_requirement() {
        let list = build_dependency_list(&sample_discovery());
        let dep = list
            .dependencies
            .iter()
            .find(|d| d.name == "Some.Package")
            .unwrap();

        assert_eq!(dep.version.as_deref(), Some("1.0.0"));
        assert_eq!(dep.requirements.len(), 1);
        let requirement = &dep.requirements[0];
        assert_eq!(requirement.file, "/src/app/app.csproj");
        assert_eq!(requirement.requirement, "1.0.0");
        assert_eq!(requirement.groups, vec!["dependencies"]);
        assert!(requirement.source.is_none());
    }

    #[test]
    fn test_transitive_dependency_has_no_requirements() {
        let list = build_dependency_list(&sample_discovery());
        let dep = list
            .dependencies
            .iter()
            .find(|d| d.name == "Transitive.Package")
            .unwrap();
        assert!(dep.requirements.is_empty());
        assert_eq!(dep.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_unknown_version_is_omitted() {
        let list = build_dependency_list(&sample_discovery());
        assert!(list.dependencies.iter().all(|d| d.name != "No.Version"));
        assert_eq!(list.dependencies.len(), 3);
    }

    #[test]
    fn test_dependency_files_include_auxiliary_manifests() {
        let list = build_dependency_list(&sample_discovery());
        assert_eq!(
            list.dependency_files,
            vec![
                "/src/app/app.csproj",
                "/src/lib/lib.csproj",
                "/src/global.json",
                "/src/.config/dotnet-tools.json",
                "/src/Directory.Packages.props",
            ]
        );
    }

    #[test]
    fn test_empty_discovery() {
        let list = build_dependency_list(&DiscoveryResult::new("/", Vec::new()));
        assert!(list.dependencies.is_empty());
        assert!(list.dependency_files.is_empty());
    }
}
