//! Core library for the CodeLab code execution service.
//!
//! This crate provides the infrastructure for running short, untrusted
//! JavaScript and Python snippets to completion under a wall-clock bound and
//! capturing everything they print. The design accepts that the interpreter
//! runs with the host's ambient privileges (no kernel-level sandboxing) and
//! concentrates on output discipline, bounded execution time, and a scratch
//! area that cannot grow without limit.
//!
//! # Architecture Overview
//!
//! The crate is organized around a small number of subsystems:
//!
//! - **Scratch workspace**: collision-free per-request files plus a periodic
//!   sweep that reclaims anything an aborted request left behind
//! - **Language runners**: per-language wrapping of raw source into the exact
//!   program text handed to an external interpreter
//! - **Execution backends**: child-process spawning with timeout enforcement,
//!   interpreter fallback chains, and output classification
//! - **Configuration system**: YAML configuration with sensible defaults for
//!   timeouts, retention, and execution policy

pub mod config;
pub mod core_types;
pub mod errors;
pub mod executors;
pub mod runners;
pub mod workspace;

pub use config::{ConfigLoader, ServiceConfig};
pub use core_types::{ExecutionResult, Language, RunRequest, NO_OUTPUT_SENTINEL};
pub use errors::ExecError;
pub use executors::{CodeExecutor, LocalCodeExecutor};
pub use workspace::{ScratchSpace, SweepTask};
