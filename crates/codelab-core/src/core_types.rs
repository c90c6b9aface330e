//! Core type definitions for the execution request/response contract.
//!
//! These types form the wire contract between the web UI and the execution
//! service. The shape is deliberately flat: callers get a single `success`
//! flag and a single `output` string, whether that string is the program's
//! captured stdout or a human-readable error description.

use crate::errors::ExecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed substitute for programs that complete without printing anything.
pub const NO_OUTPUT_SENTINEL: &str = "Code executed successfully! (No output)";

/// Languages the service knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Python,
}

impl Language {
    /// File extension used for the materialized scratch file.
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Javascript => "js",
            Language::Python => "py",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "javascript" => Ok(Language::Javascript),
            "python" => Ok(Language::Python),
            other => Err(ExecError::Validation(format!(
                "Unsupported language: {}",
                other
            ))),
        }
    }
}

/// Inbound body of a run request.
///
/// Both fields are optional at the wire level so that missing-field
/// validation can produce a specific message instead of a deserialization
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Outcome of one execution, exactly as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
}

impl ExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// A failed execution. The description is prefixed with `"Error: "`,
    /// which is the only distinction the contract makes between the
    /// program's own failure and the runner's failure to execute it.
    pub fn failure(description: impl fmt::Display) -> Self {
        Self {
            success: false,
            output: format!("Error: {}", description),
        }
    }
}
