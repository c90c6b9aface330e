//! Child-process execution of prepared programs on the host.
//!
//! One invocation spawns the external interpreter on the scratch file,
//! captures stdout/stderr to completion, and enforces the wall-clock bound.
//! For languages with several conventional binary names the executor walks
//! an ordered candidate chain, advancing only when the spawn itself fails
//! with "not found", never on the user program's own failure.

use crate::config::ExecutionConfig;
use crate::core_types::{ExecutionResult, Language, NO_OUTPUT_SENTINEL};
use crate::errors::ExecError;
use crate::runners::{JavascriptRunner, LanguageRunner, PythonRunner};
use crate::workspace::ScratchSpace;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};

use super::CodeExecutor;

pub struct LocalCodeExecutor {
    scratch: Arc<ScratchSpace>,
    timeout: Duration,
    stderr_is_failure: bool,
    javascript: JavascriptRunner,
    python: PythonRunner,
}

impl LocalCodeExecutor {
    pub fn new(scratch: Arc<ScratchSpace>, config: &ExecutionConfig) -> Self {
        Self {
            scratch,
            timeout: config.timeout(),
            stderr_is_failure: config.stderr_is_failure,
            javascript: JavascriptRunner,
            python: PythonRunner::new(config.restricted_python),
        }
    }

    fn runner(&self, language: Language) -> &dyn LanguageRunner {
        match language {
            Language::Javascript => &self.javascript,
            Language::Python => &self.python,
        }
    }

    /// Try each candidate interpreter in order until one spawns.
    ///
    /// Only a "binary not found" spawn failure advances the chain; any
    /// other spawn error, and everything after a successful spawn, settles
    /// the result.
    async fn run_candidates(&self, candidates: &[&str], script: &Path) -> ExecutionResult {
        for candidate in candidates {
            let spawned = Command::new(candidate)
                .arg(script)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn();
            match spawned {
                Ok(child) => return self.wait_for(candidate, child).await,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!(
                        "interpreter '{}' not found, trying next candidate",
                        candidate
                    );
                }
                Err(e) => {
                    return ExecutionResult::failure(ExecError::Spawn(format!(
                        "{}: {}",
                        candidate, e
                    )))
                }
            }
        }

        let preferred = candidates.first().copied().unwrap_or("interpreter");
        log::warn!("no usable interpreter among {:?}", candidates);
        ExecutionResult::failure(format!(
            "No usable {} interpreter was found on this host. \
             Install {} and make sure it is on the PATH.",
            preferred, preferred
        ))
    }

    async fn wait_for(&self, candidate: &str, child: Child) -> ExecutionResult {
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return ExecutionResult::failure(format!(
                    "failed to collect output from {}: {}",
                    candidate, e
                ))
            }
            Err(_) => {
                // Dropping the wait future drops the child handle, and
                // kill_on_drop force-kills the process even if it ignores
                // polite termination.
                log::warn!("{} execution exceeded {:?}, killed", candidate, self.timeout);
                return ExecutionResult::failure(ExecError::Timeout(
                    self.timeout.as_millis() as u64
                ));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                format!("process exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            return ExecutionResult::failure(detail);
        }

        if self.stderr_is_failure && !stderr.trim().is_empty() {
            return ExecutionResult::failure(stderr.trim().to_string());
        }

        let stdout = stdout.trim();
        if stdout.is_empty() {
            ExecutionResult::success(NO_OUTPUT_SENTINEL)
        } else {
            ExecutionResult::success(stdout)
        }
    }
}

#[async_trait]
impl CodeExecutor for LocalCodeExecutor {
    async fn execute_code(
        &self,
        language: Language,
        code: &str,
    ) -> Result<ExecutionResult, ExecError> {
        let runner = self.runner(language);
        let program = runner.prepare(code);

        let script = self.scratch.allocate(runner.extension());
        if let Err(e) = tokio::fs::write(&script, &program).await {
            self.scratch.release(&script).await;
            return Err(ExecError::Io(format!(
                "failed to write scratch file {}: {}",
                script.display(),
                e
            )));
        }

        let result = self.run_candidates(runner.candidates(), &script).await;
        self.scratch.release(&script).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn executor_with(dir: &TempDir, config: ExecutionConfig) -> LocalCodeExecutor {
        let scratch =
            Arc::new(ScratchSpace::new(dir.path().join("scratch"), HOUR).unwrap());
        LocalCodeExecutor::new(scratch, &config)
    }

    fn executor(dir: &TempDir) -> LocalCodeExecutor {
        executor_with(dir, ExecutionConfig::default())
    }

    async fn script(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("script.sh");
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "echo hello").await;
        let result = exec.run_candidates(&["sh"], &script).await;
        assert_eq!(result, ExecutionResult::success("hello"));
    }

    #[tokio::test]
    async fn empty_stdout_becomes_the_sentinel() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "true").await;
        let result = exec.run_candidates(&["sh"], &script).await;
        assert_eq!(result, ExecutionResult::success(NO_OUTPUT_SENTINEL));
    }

    #[tokio::test]
    async fn stderr_with_zero_exit_fails_by_default() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "echo oops 1>&2").await;
        let result = exec.run_candidates(&["sh"], &script).await;
        assert!(!result.success);
        assert_eq!(result.output, "Error: oops");
    }

    #[tokio::test]
    async fn stderr_can_be_treated_as_benign() {
        let dir = TempDir::new().unwrap();
        let exec = executor_with(
            &dir,
            ExecutionConfig {
                stderr_is_failure: false,
                ..Default::default()
            },
        );
        let script = script(&dir, "echo warning 1>&2; echo result").await;
        let result = exec.run_candidates(&["sh"], &script).await;
        assert_eq!(result, ExecutionResult::success("result"));
    }

    #[tokio::test]
    async fn nonzero_exit_fails_with_the_status() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "exit 3").await;
        let result = exec.run_candidates(&["sh"], &script).await;
        assert!(!result.success);
        assert!(result.output.starts_with("Error: "));
        assert!(result.output.contains("exit"));
    }

    #[tokio::test]
    async fn nonzero_exit_prefers_stderr_detail() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "echo broken 1>&2; exit 1").await;
        let result = exec.run_candidates(&["sh"], &script).await;
        assert_eq!(result.output, "Error: broken");
    }

    #[tokio::test]
    async fn timeout_kills_the_child_within_the_bound() {
        let dir = TempDir::new().unwrap();
        let exec = executor_with(
            &dir,
            ExecutionConfig {
                timeout_ms: 100,
                ..Default::default()
            },
        );
        let script = script(&dir, "sleep 30").await;
        let started = Instant::now();
        let result = exec.run_candidates(&["sh"], &script).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!result.success);
        assert!(result.output.contains("timed out after 100 ms"));
    }

    #[tokio::test]
    async fn spawn_failure_advances_to_the_next_candidate() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "echo fallback").await;
        let result = exec
            .run_candidates(&["definitely-not-a-real-binary", "sh"], &script)
            .await;
        assert_eq!(result, ExecutionResult::success("fallback"));
    }

    #[tokio::test]
    async fn user_failure_never_advances_the_chain() {
        // The first candidate spawns fine and the program fails; the second
        // candidate would have succeeded but must not be consulted.
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "exit 7").await;
        let result = exec.run_candidates(&["sh", "sh"], &script).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn exhausted_chain_yields_operator_guidance() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        let script = script(&dir, "echo unreachable").await;
        let result = exec
            .run_candidates(&["no-such-interp-a", "no-such-interp-b"], &script)
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Install no-such-interp-a"));
    }

    #[tokio::test]
    async fn execute_code_always_releases_the_scratch_file() {
        let dir = TempDir::new().unwrap();
        let exec = executor(&dir);
        // Whether or not a node binary exists on the host, the scratch file
        // must be gone afterwards.
        let result = exec
            .execute_code(Language::Javascript, "console.log('hi')")
            .await
            .unwrap();
        assert!(!result.output.is_empty());
        let mut entries = tokio::fs::read_dir(exec.scratch.root()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }
}
