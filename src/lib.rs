//! update-runner - Multi-directory dependency update orchestration
//!
//! This library runs a dependency update job across one or more directories
//! of a repository checkout:
//! - Loads and validates the job file
//! - Reports each directory's current dependencies
//! - Analyzes and applies updates through an external helper
//! - Detects changed files and proposes pull requests
//! - Aggregates every directory into one run output

pub mod aggregate;
pub mod api;
pub mod cli;
pub mod collaborator;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod progress;
pub mod pull_request;
pub mod snapshot;
pub mod wire;
