//! Collaborators backed by an external helper program
//!
//! The helper is invoked once per operation:
//! - `discover --repo-root R --workspace DIR --output F`
//! - `analyze --repo-root R --discovery-file D --dependency-file I --output F`
//! - `update --repo-root R --file PATH --dependency N --previous-version V
//!   --new-version W [--transitive] --output F`
//!
//! Each invocation writes its JSON result to `F`, a file in a scratch
//! directory owned by the `HelperCommand`. Input and output files are
//! removed once the operation finishes.

use super::{Analyzer, Applier, Discovery};
use crate::config::HelperConfig;
use crate::domain::{AnalysisResult, ApplyOutcome, ApplyRequest, DependencyInfo, DiscoveryResult};
use crate::error::{CollaboratorError, ConfigError};
use crate::wire::WireFormat;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

/// Helper program driving discovery, analysis and updates
#[derive(Debug)]
pub struct HelperCommand {
    program: PathBuf,
    args: Vec<String>,
    wire: WireFormat,
    scratch: TempDir,
    sequence: AtomicUsize,
}

impl HelperCommand {
    /// Create a helper for `program`, with `args` placed before each subcommand
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        wire: WireFormat,
    ) -> Result<Self, CollaboratorError> {
        let scratch = TempDir::new()
            .map_err(|e| CollaboratorError::scratch("helper", std::env::temp_dir(), e))?;
        Ok(Self {
            program: program.into(),
            args,
            wire,
            scratch,
            sequence: AtomicUsize::new(0),
        })
    }

    /// Create a helper from configuration
    pub fn from_config(config: &HelperConfig, wire: WireFormat) -> Result<Self, ConfigError> {
        let program = config
            .program
            .clone()
            .ok_or_else(|| ConfigError::MissingValue {
                key: "helper.program".to_string(),
            })?;
        Self::new(program, config.args.clone(), wire).map_err(|e| ConfigError::InvalidValue {
            key: "helper".to_string(),
            message: e.to_string(),
        })
    }

    /// A fresh file path in the scratch directory
    fn scratch_file(&self, label: &str) -> PathBuf {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.scratch.path().join(format!("{}-{}.json", label, n))
    }

    /// Serialize an input document for the helper
    async fn write_input<T: Serialize + Sync>(
        &self,
        operation: &str,
        path: &Path,
        value: &T,
    ) -> Result<(), CollaboratorError> {
        let json = self
            .wire
            .encode(value)
            .map_err(|e| CollaboratorError::invalid_output(operation, path, e.to_string()))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| CollaboratorError::scratch(operation, path, e))
    }

    /// Remove scratch files once an operation is done with them
    async fn discard(&self, paths: &[&Path]) {
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Could not remove scratch file")
                }
            }
        }
    }

    /// Invoke `operation` and decode what it wrote to `output`
    async fn run<T: DeserializeOwned>(
        &self,
        operation: &str,
        args: Vec<OsString>,
        output: &Path,
    ) -> Result<T, CollaboratorError> {
        self.invoke(operation, args).await?;
        self.read_output(operation, output).await
    }

    async fn run_analysis(
        &self,
        repo_root: &Path,
        discovery: &DiscoveryResult,
        dependency: &DependencyInfo,
        discovery_file: &Path,
        dependency_file: &Path,
        output: &Path,
    ) -> Result<AnalysisResult, CollaboratorError> {
        self.write_input("analyze", discovery_file, discovery).await?;
        self.write_input("analyze", dependency_file, dependency).await?;
        let args = [
            flag("--repo-root", repo_root),
            flag("--discovery-file", discovery_file),
            flag("--dependency-file", dependency_file),
            flag("--output", output),
        ]
        .concat();
        self.run("analyze", args, output).await
    }

    /// Run one helper operation to completion
    async fn invoke(&self, operation: &str, args: Vec<OsString>) -> Result<(), CollaboratorError> {
        debug!(program = %self.program.display(), operation, "Invoking helper");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(operation)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CollaboratorError::SpawnError {
                operation: operation.to_string(),
                program: self.program.display().to_string(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(operation, "{}", stdout.trim_end());
        }

        if !output.status.success() {
            return Err(CollaboratorError::Failed {
                operation: operation.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Read and decode the JSON result an operation wrote
    async fn read_output<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &Path,
    ) -> Result<T, CollaboratorError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            CollaboratorError::invalid_output(operation, path, format!("no result written: {}", e))
        })?;
        self.wire
            .decode(&text)
            .map_err(|e| CollaboratorError::invalid_output(operation, path, e.to_string()))
    }
}

fn flag(name: &str, value: impl Into<OsString>) -> [OsString; 2] {
    [OsString::from(name), value.into()]
}

#[async_trait]
impl Discovery for HelperCommand {
    async fn discover(
        &self,
        repo_root: &Path,
        directory: &str,
    ) -> Result<DiscoveryResult, CollaboratorError> {
        let output = self.scratch_file("discovery");
        let args = [
            flag("--repo-root", repo_root),
            flag("--workspace", directory),
            flag("--output", &output),
        ]
        .concat();
        let result = self.run("discover", args, &output).await;
        self.discard(&[&output]).await;
        result
    }
}

#[async_trait]
impl Analyzer for HelperCommand {
    async fn analyze(
        &self,
        repo_root: &Path,
        discovery: &DiscoveryResult,
        dependency: &DependencyInfo,
    ) -> Result<AnalysisResult, CollaboratorError> {
        let discovery_file = self.scratch_file("discovery-input");
        let dependency_file = self.scratch_file("dependency-input");
        let output = self.scratch_file("analysis");
        let result = self
            .run_analysis(
                repo_root,
                discovery,
                dependency,
                &discovery_file,
                &dependency_file,
                &output,
            )
            .await;
        self.discard(&[&discovery_file, &dependency_file, &output]).await;
        result
    }
}

#[async_trait]
impl Applier for HelperCommand {
    async fn apply(
        &self,
        repo_root: &Path,
        request: &ApplyRequest,
    ) -> Result<ApplyOutcome, CollaboratorError> {
        let output = self.scratch_file("update");
        let mut args = [
            flag("--repo-root", repo_root),
            flag("--file", &request.file_path),
            flag("--dependency", &request.dependency_name),
            flag("--previous-version", &request.previous_version),
            flag("--new-version", &request.new_version),
        ]
        .concat();
        if request.is_transitive {
            args.push(OsString::from("--transitive"));
        }
        args.extend(flag("--output", &output));
        let result = self.run("update", args, &output).await;
        self.discard(&[&output]).await;
        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    const SCRIPT: &str = r#"#!/bin/sh
op="$1"
shift
out=""
transitive="false"
while [ $# -gt 0 ]; do
  case "$1" in
    --output) out="$2"; shift 2 ;;
    --transitive) transitive="true"; shift ;;
    *) shift ;;
  esac
done
case "$op" in
  discover)
    printf '%s' '{"path":"/src","projects":[{"file-path":"a.csproj","dependencies":[{"name":"Some.Package","version":"1.0.0"}]}]}' > "$out" ;;
  analyze)
    printf '%s' '{"can-update":true,"updated-version":"2.0.0","updated-dependencies":[{"name":"Some.Package","info-url":"https://example.test"}]}' > "$out" ;;
  update)
    if [ "$transitive" = "true" ]; then
      printf '%s' '{"error-type":"UpdateNotPossible","error-details":"transitive"}' > "$out"
    else
      printf '%s' '{}' > "$out"
    fi ;;
  *)
    echo "unknown operation $op" >&2
    exit 3 ;;
esac
"#;

    fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn request(is_transitive: bool) -> ApplyRequest {
        ApplyRequest {
            file_path: "/src/a.csproj".to_string(),
            dependency_name: "Some.Package".to_string(),
            previous_version: "1.0.0".to_string(),
            new_version: "2.0.0".to_string(),
            is_transitive,
        }
    }

    #[tokio::test]
    async fn test_discover_analyze_update() {
        let dir = TempDir::new().unwrap();
        let program = write_script(&dir, "helper.sh", SCRIPT);
        let helper = HelperCommand::new(program, Vec::new(), WireFormat::default()).unwrap();

        let discovery = helper.discover(dir.path(), "/src").await.unwrap();
        assert_eq!(discovery.path, "/src");
        assert_eq!(discovery.projects[0].dependencies[0].name, "Some.Package");

        let info = DependencyInfo::new("Some.Package", "1.0.0");
        let analysis = helper.analyze(dir.path(), &discovery, &info).await.unwrap();
        assert!(analysis.can_update);
        assert_eq!(analysis.updated_version, "2.0.0");

        let outcome = helper.apply(dir.path(), &request(false)).await.unwrap();
        assert!(outcome.is_success());

        let outcome = helper.apply(dir.path(), &request(true)).await.unwrap();
        assert!(!outcome.is_success());
    }

    fn scratch_entries(helper: &HelperCommand) -> usize {
        fs::read_dir(helper.scratch.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_scratch_files_removed_after_each_operation() {
        let dir = TempDir::new().unwrap();
        let program = write_script(&dir, "helper.sh", SCRIPT);
        let helper = HelperCommand::new(program, Vec::new(), WireFormat::default()).unwrap();

        let discovery = helper.discover(dir.path(), "/src").await.unwrap();
        assert_eq!(scratch_entries(&helper), 0);

        for version in ["1.0.0", "1.1.0", "1.2.0"] {
            let info = DependencyInfo::new("Some.Package", version);
            helper.analyze(dir.path(), &discovery, &info).await.unwrap();
            assert_eq!(scratch_entries(&helper), 0);
        }

        helper.apply(dir.path(), &request(false)).await.unwrap();
        assert_eq!(scratch_entries(&helper), 0);
    }

    #[tokio::test]
    async fn test_failing_helper() {
        let dir = TempDir::new().unwrap();
        let program = write_script(&dir, "fail.sh", "#!/bin/sh\necho broken >&2\nexit 2\n");
        let helper = HelperCommand::new(program, Vec::new(), WireFormat::default()).unwrap();

        let err = helper.discover(dir.path(), "/").await.unwrap_err();
        match err {
            CollaboratorError::Failed { operation, stderr, .. } => {
                assert_eq!(operation, "discover");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_helper_without_output() {
        let dir = TempDir::new().unwrap();
        let program = write_script(&dir, "silent.sh", "#!/bin/sh\nexit 0\n");
        let helper = HelperCommand::new(program, Vec::new(), WireFormat::default()).unwrap();

        let err = helper.discover(dir.path(), "/").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::InvalidOutput { .. }));

        let info = DependencyInfo::new("Some.Package", "1.0.0");
        let discovery = DiscoveryResult::new("/", Vec::new());
        assert!(helper.analyze(dir.path(), &discovery, &info).await.is_err());
        assert_eq!(scratch_entries(&helper), 0);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let helper = HelperCommand::new(
            dir.path().join("does-not-exist"),
            Vec::new(),
            WireFormat::default(),
        )
        .unwrap();

        let err = helper.discover(dir.path(), "/").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::SpawnError { .. }));
    }

    #[test]
    fn test_from_config_requires_program() {
        let err = HelperCommand::from_config(&HelperConfig::default(), WireFormat::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue { .. }));
    }

    #[test]
    fn test_scratch_files_are_unique() {
        let helper = HelperCommand::new("helper", Vec::new(), WireFormat::default()).unwrap();
        let first = helper.scratch_file("analysis");
        let second = helper.scratch_file("analysis");
        assert_ne!(first, second);
        assert!(first.starts_with(helper.scratch.path()));
    }
}
