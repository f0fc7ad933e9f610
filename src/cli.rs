//! CLI argument parsing module for update-runner

use clap::Parser;
use std::path::PathBuf;

/// Multi-directory dependency update runner
#[derive(Parser, Debug, Clone)]
#[command(
    name = "update-runner",
    version,
    about = "Runs a dependency update job across repository directories"
)]
pub struct CliArgs {
    /// Path to the job file
    #[arg(long)]
    pub job_path: PathBuf,

    /// Root of the repository checkout
    #[arg(long)]
    pub repo_contents_path: PathBuf,

    /// Commit the change set applies against
    #[arg(long)]
    pub base_commit_sha: String,

    /// Where to write the run output JSON
    #[arg(long)]
    pub output_path: PathBuf,

    // Configuration
    /// Runner configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ecosystem helper program performing discovery, analysis and updates
    #[arg(long)]
    pub helper: Option<PathBuf>,

    /// Package manager identifier jobs must carry
    #[arg(long)]
    pub package_manager: Option<String>,

    /// Base URL of the update-job API (log-only reporting when absent)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Identifier of the update job on the API
    #[arg(long)]
    pub job_id: Option<String>,

    // Output options
    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Default log filter for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const REQUIRED: [&str; 9] = [
        "update-runner",
        "--job-path",
        "/tmp/job.json",
        "--repo-contents-path",
        "/tmp/repo",
        "--base-commit-sha",
        "abc123",
        "--output-path",
        "/tmp/output.json",
    ];

    #[test]
    fn test_required_args() {
        let args = CliArgs::parse_from(REQUIRED);
        assert_eq!(args.job_path, PathBuf::from("/tmp/job.json"));
        assert_eq!(args.repo_contents_path, PathBuf::from("/tmp/repo"));
        assert_eq!(args.base_commit_sha, "abc123");
        assert_eq!(args.output_path, PathBuf::from("/tmp/output.json"));
        assert!(args.config.is_none());
        assert!(args.helper.is_none());
        assert!(args.api_url.is_none());
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_missing_required_arg() {
        let result = CliArgs::try_parse_from(["update-runner", "--job-path", "job.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_args() {
        let mut argv = REQUIRED.to_vec();
        argv.extend([
            "--helper",
            "/opt/helper",
            "--api-url",
            "http://localhost:3000",
            "--job-id",
            "7",
            "--package-manager",
            "nuget",
            "-q",
        ]);
        let args = CliArgs::parse_from(argv);
        assert_eq!(args.helper, Some(PathBuf::from("/opt/helper")));
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(args.job_id.as_deref(), Some("7"));
        assert_eq!(args.package_manager.as_deref(), Some("nuget"));
        assert!(args.quiet);
    }

    #[test]
    fn test_log_level() {
        let args = CliArgs::parse_from(REQUIRED);
        assert_eq!(args.log_level(), "info");

        let mut argv = REQUIRED.to_vec();
        argv.push("--verbose");
        assert_eq!(CliArgs::parse_from(argv).log_level(), "debug");

        let mut argv = REQUIRED.to_vec();
        argv.push("--quiet");
        assert_eq!(CliArgs::parse_from(argv).log_level(), "warn");
    }
}
