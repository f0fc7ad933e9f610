//! Job file loading and run output writing

use crate::domain::{JobFile, RunResult};
use crate::error::{IoError, JobError};
use crate::wire::WireFormat;
use std::path::Path;
use tracing::debug;

/// Decode a job wrapper and check it targets `expected_package_manager`
///
/// Both failures are terminal: no directory is processed for a job that
/// does not decode or belongs to another ecosystem.
pub fn parse_job(
    text: &str,
    wire: &WireFormat,
    expected_package_manager: &str,
) -> Result<JobFile, JobError> {
    let job_file: JobFile = wire
        .decode(text)
        .map_err(|e| JobError::malformed(e.to_string()))?;

    if job_file.job.package_manager != expected_package_manager {
        return Err(JobError::package_manager_mismatch(
            expected_package_manager,
            &job_file.job.package_manager,
        ));
    }

    Ok(job_file)
}

/// Read and validate a job file from disk
pub async fn load_job(
    path: &Path,
    wire: &WireFormat,
    expected_package_manager: &str,
) -> Result<JobFile, JobError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| JobError::read_error(path, e))?;
    debug!(path = %path.display(), "Loaded job file");
    parse_job(&text, wire, expected_package_manager)
}

/// Write the run output as JSON
pub async fn write_run_result(
    path: &Path,
    result: &RunResult,
    wire: &WireFormat,
) -> Result<(), IoError> {
    let json = wire.encode(result).map_err(|e| IoError::EncodeError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| IoError::write_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyFile;
    use tempfile::TempDir;

    const JOB: &str = r#"{
        "job": {
            "package-manager": "nuget",
            "source": {"provider": "github", "repo": "o/r", "directory": "/src"},
            "allowed-updates": [{"update-type": "all"}]
        }
    }"#;

    #[test]
    fn test_parse_job() {
        let job_file = parse_job(JOB, &WireFormat::default(), "nuget").unwrap();
        assert_eq!(job_file.job.all_directories(), vec!["/src"]);
        assert!(job_file.job.allows_full_update());
    }

    #[test]
    fn test_parse_job_package_manager_mismatch() {
        let err = parse_job(JOB, &WireFormat::default(), "npm_and_yarn").unwrap_err();
        assert!(matches!(
            err,
            JobError::PackageManagerMismatch { ref expected, ref actual }
                if expected == "npm_and_yarn" && actual == "nuget"
        ));
    }

    #[test]
    fn test_parse_job_malformed() {
        let err = parse_job("{ not json", &WireFormat::default(), "nuget").unwrap_err();
        assert!(matches!(err, JobError::Malformed { .. }));

        let err = parse_job("null", &WireFormat::default(), "nuget").unwrap_err();
        assert!(matches!(err, JobError::Malformed { .. }));

        let err = parse_job(r#"{"job": {"source": {}}}"#, &WireFormat::default(), "nuget")
            .unwrap_err();
        assert!(matches!(err, JobError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_load_job_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_job(&dir.path().join("job.json"), &WireFormat::default(), "nuget")
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::ReadError { .. }));
    }

    #[tokio::test]
    async fn test_load_job_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, JOB).unwrap();
        let job_file = load_job(&path, &WireFormat::default(), "nuget").await.unwrap();
        assert_eq!(job_file.job.package_manager, "nuget");
    }

    #[tokio::test]
    async fn test_write_run_result() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output.json");
        let result = RunResult {
            base64_dependency_files: vec![DependencyFile {
                name: "a.csproj".to_string(),
                content: "YWJj".to_string(),
                directory: "/".to_string(),
            }],
            base_commit_sha: "abc123".to_string(),
        };
        write_run_result(&path, &result, &WireFormat::default())
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"base-commit-sha\": \"abc123\""));
        let parsed: RunResult = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, result);
    }
}
