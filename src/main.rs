//! update-runner - Multi-directory dependency update runner
//!
//! Loads a job, runs every configured directory through the update
//! pipeline and writes the aggregated run output as JSON.

use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use update_runner::api::{ApiHandler, HttpApiHandler, LogApiHandler};
use update_runner::cli::CliArgs;
use update_runner::collaborator::{Collaborators, HelperCommand};
use update_runner::config::RunnerConfig;
use update_runner::error::{AppError, IoError};
use update_runner::loader::{load_job, write_run_result};
use update_runner::orchestrator::Orchestrator;
use update_runner::output::SummaryFormatter;
use update_runner::wire::WireFormat;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunnerConfig::resolve(&args)?;
    let wire = WireFormat::default();

    let job_file = load_job(&args.job_path, &wire, &config.package_manager).await?;
    let job = job_file.job;

    if !args.repo_contents_path.is_dir() {
        return Err(AppError::from(IoError::directory_not_found(&args.repo_contents_path)).into());
    }

    let helper = HelperCommand::from_config(&config.helper, wire)?;
    let collaborators = Collaborators::from_helper(helper);
    let api = build_api(&config, wire)?;

    info!(
        directories = job.all_directories().len(),
        base_commit_sha = %args.base_commit_sha,
        "Starting update run"
    );

    let orchestrator =
        Orchestrator::new(config, collaborators, api, wire).with_progress(!args.quiet);
    let run = orchestrator.run(&job, &args.repo_contents_path, &args.base_commit_sha);
    let report = if job.max_updater_run_time > 0 {
        let seconds = job.max_updater_run_time;
        tokio::time::timeout(Duration::from_secs(seconds), run)
            .await
            .map_err(|_| AppError::TimedOut { seconds })??
    } else {
        run.await?
    };

    write_run_result(&args.output_path, &report.result, &wire)
        .await
        .with_context(|| format!("writing {}", args.output_path.display()))?;
    info!(
        files = report.result.base64_dependency_files.len(),
        path = %args.output_path.display(),
        "Wrote run output"
    );

    if !args.quiet {
        let mut stdout = io::stdout().lock();
        SummaryFormatter::new(args.verbose).format(&report, &mut stdout)?;
        stdout.flush()?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Report over HTTP when an API URL is configured, otherwise only log
fn build_api(config: &RunnerConfig, wire: WireFormat) -> anyhow::Result<Box<dyn ApiHandler>> {
    match (&config.api.url, &config.api.job_id) {
        (Some(url), Some(job_id)) => {
            let handler = HttpApiHandler::new(&config.api, job_id, url, wire)?;
            Ok(Box::new(handler))
        }
        _ => Ok(Box::new(LogApiHandler::new())),
    }
}
