//! Runner configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags. Everything has a default except the helper program,
//! which must be given one way or the other.

use crate::cli::CliArgs;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Package manager this updater implements unless configured otherwise
pub const DEFAULT_PACKAGE_MANAGER: &str = "nuget";

/// Pseudo-dependency representing the SDK itself
pub const DEFAULT_TOOLCHAIN_DEPENDENCY: &str = "Microsoft.NET.Sdk";

/// Default request timeout for the reporting API (30 seconds)
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Default number of API retries
const DEFAULT_API_MAX_RETRIES: u32 = 3;

/// Top-level runner configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Package manager identifier jobs must carry
    pub package_manager: String,
    /// Dependency names that are never analyzed or updated
    pub toolchain_dependencies: Vec<String>,
    pub helper: HelperConfig,
    pub api: ApiConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
            toolchain_dependencies: vec![DEFAULT_TOOLCHAIN_DEPENDENCY.to_string()],
            helper: HelperConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// External ecosystem helper program
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelperConfig {
    pub program: Option<PathBuf>,
    /// Arguments placed before the subcommand
    pub args: Vec<String>,
}

/// Reporting API settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub job_id: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            job_id: None,
            token: None,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            max_retries: DEFAULT_API_MAX_RETRIES,
        }
    }
}

impl RunnerConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&text, path)
    }

    /// Build the effective configuration from CLI arguments
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file values
    pub fn with_overrides(mut self, args: &CliArgs) -> Self {
        if let Some(package_manager) = &args.package_manager {
            self.package_manager = package_manager.clone();
        }
        if let Some(helper) = &args.helper {
            self.helper.program = Some(helper.clone());
        }
        if let Some(url) = &args.api_url {
            self.api.url = Some(url.clone());
        }
        if let Some(job_id) = &args.job_id {
            self.api.job_id = Some(job_id.clone());
        }
        self
    }

    /// Check the settings for values that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.package_manager.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "package_manager".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.api.url.is_some() && self.api.job_id.is_none() {
            return Err(ConfigError::MissingValue {
                key: "api.job_id".to_string(),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "api.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Returns true if `name` is a toolchain pseudo-dependency
    pub fn is_toolchain_dependency(&self, name: &str) -> bool {
        self.toolchain_dependencies.iter().any(|t| t == name)
    }
}
