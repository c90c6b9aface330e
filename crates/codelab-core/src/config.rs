//! Service configuration loaded from YAML files.
//!
//! Every field has a default, so a missing or minimal configuration file
//! yields a working service. The defaults are conservative for a
//! public-facing deployment: Python runs in restricted mode and any stderr
//! output counts as a failed execution.

use crate::errors::ExecError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub scratch: ScratchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Wall-clock bound for one interpreter invocation.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Whether stderr output from a zero-exit process fails the execution.
    /// Some interpreters emit benign warnings to stderr, so this is a
    /// deployment decision rather than a fixed rule.
    #[serde(default = "default_true")]
    pub stderr_is_failure: bool,
    /// Whether Python snippets run with the standard-library deny-list
    /// installed before their first statement.
    #[serde(default = "default_true")]
    pub restricted_python: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            stderr_is_failure: true,
            restricted_python: true,
        }
    }
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchConfig {
    /// Scratch directory root, created at startup if absent. Relative paths
    /// are resolved against the working directory.
    #[serde(default = "default_scratch_dir")]
    pub dir: PathBuf,
    /// Maximum age a scratch file may reach before the sweep reclaims it.
    #[serde(default = "default_retention_ms")]
    pub retention_ms: u64,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            dir: default_scratch_dir(),
            retention_ms: default_retention_ms(),
        }
    }
}

impl ScratchConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_millis(self.retention_ms)
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retention_ms() -> u64 {
    3_600_000
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_true() -> bool {
    true
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ExecError> {
        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| {
                ExecError::Config(format!(
                    "Invalid bind address '{}': {}",
                    self.server.bind_addr, e
                ))
            })?;
        if self.execution.timeout_ms == 0 {
            return Err(ExecError::Config(
                "execution.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.scratch.retention_ms == 0 {
            return Err(ExecError::Config(
                "scratch.retention_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loader with validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ExecError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            ExecError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_str(&content)
    }

    /// Load configuration from a YAML string.
    pub fn from_str(content: &str) -> Result<ServiceConfig, ExecError> {
        let config: ServiceConfig = serde_yaml::from_str(content)
            .map_err(|e| ExecError::Config(format!("Failed to parse YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ExecError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "no configuration file at {}, using defaults",
                path.display()
            );
            return Ok(ServiceConfig::default());
        }
        Self::from_file(path).await
    }
}
