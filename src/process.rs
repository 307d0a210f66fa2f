//! External command execution.
//!
//! Every nontrivial operation in dream-runner is delegated to an external
//! tool (`gsutil`, `cwltool`, `cwl-runner`, the portal client). The
//! [`CommandRunner`] trait is the single seam through which those tools are
//! invoked, so handlers stay testable without any of them installed.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Runs an external command and captures its standard output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// Returns captured stdout on a zero exit status. A spawn failure or a
    /// nonzero exit status is an [`Error::Runner`].
    async fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

/// [`CommandRunner`] backed by real subprocesses.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        debug!(program, ?args, "spawning external command");

        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::Runner(format!("failed to spawn '{}': {}", program, e)))?;

        if !output.status.success() {
            return Err(Error::Runner(format!(
                "'{}' exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Render an argv for logging.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}


#[cfg(test)]
mod tests {
    use super::mock::MockRunner;
    use super::*;

    #[test]
    fn test_display_command() {
        let args = vec!["cp".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(display_command("gsutil", &args), "gsutil cp a b");
    }

    #[tokio::test]
    async fn test_mock_records_calls_in_order() {
        let runner = MockRunner::new();
        runner.succeed_with("gsutil", "ok");

        runner.run("gsutil", &["ls".to_string()]).await.unwrap();
        runner.run("gunzip", &["x.gz".to_string()]).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec!["gsutil", "ls"]);
        assert_eq!(calls[1], vec!["gunzip", "x.gz"]);
    }

    #[tokio::test]
    async fn test_mock_failure_is_runner_error() {
        let runner = MockRunner::new();
        runner.fail_with("gsutil", "AccessDenied");

        let err = runner.run("gsutil", &[]).await.unwrap_err();
        assert_eq!(err.code(), "RUNNER_ERROR");
        assert!(err.to_string().contains("AccessDenied"));
    }
}
