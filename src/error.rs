//! Application error types using thiserror
//!
//! Error hierarchy:
//! - JobError: Issues with the job file (terminal)
//! - ConfigError: Issues with the runner configuration (terminal)
//! - CollaboratorError: Failures of the discovery/analysis/apply helpers
//! - ApiError: Failures talking to the reporting API
//! - IoError: File system operation failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
///
/// Everything that reaches the caller of a whole run as an `AppError` is
/// terminal. Directory- and dependency-scoped failures are absorbed by the
/// pipeline and never surface here.
#[derive(Error, Debug)]
pub enum AppError {
    /// Job file related errors
    #[error(transparent)]
    Job(#[from] JobError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// An updatable dependency has no counterpart in the reported snapshot
    #[error("no reported dependency '{name}' requires {file}")]
    MissingReportedDependency { name: String, file: String },

    /// The run did not finish within the job's time budget
    #[error("run exceeded the maximum updater run time of {seconds}s")]
    TimedOut { seconds: u64 },
}

/// Errors related to loading and validating the job file
#[derive(Error, Debug)]
pub enum JobError {
    /// Failed to read the job file
    #[error("failed to read job file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job wrapper could not be decoded
    #[error("malformed job file: {message}")]
    Malformed { message: String },

    /// The job targets a different package manager
    #[error("package manager must be '{expected}', found '{actual}'")]
    PackageManagerMismatch { expected: String, actual: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// A required setting is missing
    #[error("missing configuration value: {key}")]
    MissingValue { key: String },

    /// Invalid setting value
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised while invoking an external collaborator
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// The helper program could not be started
    #[error("failed to run {operation} helper '{program}': {source}")]
    SpawnError {
        operation: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The helper exited unsuccessfully
    #[error("{operation} helper exited with {status}: {stderr}")]
    Failed {
        operation: String,
        status: String,
        stderr: String,
    },

    /// The helper produced output that could not be decoded
    #[error("invalid {operation} output at {path}: {message}")]
    InvalidOutput {
        operation: String,
        path: PathBuf,
        message: String,
    },

    /// Scratch file handling failed
    #[error("{operation} scratch file {path}: {source}")]
    Scratch {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to reporting API communication
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network request failed
    #[error("request to {endpoint} failed: {message}")]
    NetworkError { endpoint: String, message: String },

    /// The API answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    StatusError { endpoint: String, status: u16 },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {endpoint}")]
    RateLimitExceeded { endpoint: String },

    /// Timeout
    #[error("timeout while calling {endpoint}")]
    Timeout { endpoint: String },

    /// The payload could not be encoded
    #[error("failed to encode payload for {endpoint}: {message}")]
    EncodeError { endpoint: String, message: String },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read a repository file
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode output
    #[error("failed to encode {path}: {message}")]
    EncodeError { path: PathBuf, message: String },
}

impl JobError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JobError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Malformed error
    pub fn malformed(message: impl Into<String>) -> Self {
        JobError::Malformed {
            message: message.into(),
        }
    }

    /// Creates a new PackageManagerMismatch error
    pub fn package_manager_mismatch(
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        JobError::PackageManagerMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl CollaboratorError {
    /// Creates a new InvalidOutput error
    pub fn invalid_output(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        CollaboratorError::InvalidOutput {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new Scratch error
    pub fn scratch(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        CollaboratorError::Scratch {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }
}

impl ApiError {
    /// Creates a new NetworkError
    pub fn network_error(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::NetworkError {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(endpoint: impl Into<String>) -> Self {
        ApiError::Timeout {
            endpoint: endpoint.into(),
        }
    }

    /// Returns true if the request is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError { .. }
            | ApiError::RateLimitExceeded { .. }
            | ApiError::Timeout { .. } => true,
            ApiError::StatusError { status, .. } => *status >= 500,
            ApiError::EncodeError { .. } => false,
        }
    }
}

impl IoError {
    /// Creates a new DirectoryNotFound error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        IoError::DirectoryNotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::WriteError {
            path: path.into(),
            source,
        }
    }
}
