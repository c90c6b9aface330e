//! Execution backends that run prepared programs to completion.
//!
//! The trait seam keeps the HTTP surface independent of how code actually
//! runs, which is also what makes the endpoint testable without an
//! interpreter on the host.

use crate::core_types::{ExecutionResult, Language};
use crate::errors::ExecError;
use async_trait::async_trait;

pub mod local;

pub use local::LocalCodeExecutor;

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Run one snippet to completion or to its timeout.
    ///
    /// Every execution-path failure (spawn, timeout, the program's own
    /// errors) is folded into the returned [`ExecutionResult`]; an `Err`
    /// here means the service itself failed before anything could run.
    async fn execute_code(
        &self,
        language: Language,
        code: &str,
    ) -> Result<ExecutionResult, ExecError>;
}
