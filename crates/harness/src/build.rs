//! Build tool invocation
//!
//! The plugin under test is driven entirely through its build tool: one
//! `grunt font:<task>` call per scenario. The output tree must not be
//! read unless [`BuildRunner::run`] returns Ok: a non-zero exit status
//! or any bytes on stderr fail the invocation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{HarnessError, HarnessResult};

/// Captured output of a successful build invocation.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub stdout: String,
}

/// Configuration for spawning the build tool.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Build tool executable
    pub program: String,

    /// Prefix joined to the task identifier (`font:` + `single`)
    pub task_prefix: String,

    /// Working directory for the invocation. Explicit per-call state,
    /// never a process-wide chdir.
    pub working_dir: PathBuf,

    /// Upper bound on how long one invocation may run
    pub timeout: Duration,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: "grunt".to_string(),
            task_prefix: "font:".to_string(),
            working_dir: PathBuf::from("tests/fixtures"),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Spawns the external build tool and captures its output.
pub struct BuildRunner {
    config: BuildConfig,
}

impl BuildRunner {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Check whether the configured build tool is on PATH.
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.config.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Run one build task to completion and capture its output.
    pub async fn run(&self, task: &str) -> HarnessResult<BuildOutput> {
        let task_arg = format!("{}{}", self.config.task_prefix, task);
        info!(
            "Running `{} {}` in {}",
            self.config.program,
            task_arg,
            self.config.working_dir.display()
        );

        // The child must not outlive a timeout; a detached build tool
        // could keep writing into the output tree of the next scenario
        let child = Command::new(&self.config.program)
            .arg(&task_arg)
            .current_dir(&self.config.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HarnessError::BuildSpawn {
                command: format!("{} {}", self.config.program, task_arg),
                source,
            })?;

        let output = timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| HarnessError::BuildTimeout {
                task: task.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(HarnessError::BuildFailed {
                task: task.to_string(),
                status: output.status.to_string(),
                stdout,
                stderr,
            });
        }

        // The build tool reports some failures on stderr with a zero exit
        if !stderr.is_empty() {
            return Err(HarnessError::BuildStderr {
                task: task.to_string(),
                stderr,
            });
        }

        debug!("Task `{}` completed ({} bytes of stdout)", task, stdout.len());
        Ok(BuildOutput { stdout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[cfg(unix)]
    fn write_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("tool.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn config_for(tool: &Path, timeout: Duration) -> BuildConfig {
        BuildConfig {
            program: tool.to_string_lossy().into_owned(),
            task_prefix: "font:".to_string(),
            working_dir: PathBuf::from("."),
            timeout,
        }
    }

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let config = BuildConfig {
            program: "echo".to_string(),
            task_prefix: "font:".to_string(),
            working_dir: PathBuf::from("."),
            timeout: Duration::from_secs(5),
        };
        let output = BuildRunner::new(config).run("single").await.unwrap();
        assert_eq!(output.stdout.trim(), "font:single");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let config = BuildConfig {
            program: "definitely-not-a-real-build-tool".to_string(),
            working_dir: PathBuf::from("."),
            ..Default::default()
        };
        let err = BuildRunner::new(config).run("single").await.unwrap_err();
        assert!(matches!(err, HarnessError::BuildSpawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_fails_with_captured_output() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_tool(dir.path(), "echo some progress; exit 3");
        let err = BuildRunner::new(config_for(&tool, Duration::from_secs(5)))
            .run("single")
            .await
            .unwrap_err();

        match err {
            HarnessError::BuildFailed { task, stdout, .. } => {
                assert_eq!(task, "single");
                assert!(stdout.contains("some progress"));
            }
            other => panic!("expected BuildFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_output_fails_even_with_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_tool(dir.path(), "echo boom >&2; exit 0");
        let err = BuildRunner::new(config_for(&tool, Duration::from_secs(5)))
            .run("single")
            .await
            .unwrap_err();

        match err {
            HarnessError::BuildStderr { stderr, .. } => assert!(stderr.contains("boom")),
            other => panic!("expected BuildStderr, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_invocation_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_tool(dir.path(), "sleep 5");
        let err = BuildRunner::new(config_for(&tool, Duration::from_millis(100)))
            .run("single")
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::BuildTimeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timed_out_child_is_killed_before_it_can_write() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_tool(dir.path(), "sleep 1\necho late > late-output.txt");
        let config = BuildConfig {
            program: tool.to_string_lossy().into_owned(),
            task_prefix: "font:".to_string(),
            working_dir: dir.path().to_path_buf(),
            timeout: Duration::from_millis(100),
        };

        let err = BuildRunner::new(config).run("single").await.unwrap_err();
        assert!(matches!(err, HarnessError::BuildTimeout { .. }));

        // A surviving child would write this after the harness gave up
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(
            !dir.path().join("late-output.txt").exists(),
            "timed-out child survived and wrote into the output tree"
        );
    }
}
