//! CWL runner invocation.
//!
//! Wraps the external `cwl-runner` executable. Its stdout is expected to be
//! a JSON object recording the produced file under `OUTPUT.path`; anything
//! else is a typed error rather than a silently missing result.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::process::{display_command, CommandRunner};

/// Step caching behavior for a runner invocation.
#[derive(Debug, Clone)]
pub enum CacheMode {
    /// Cache workflow steps under the given directory
    Cache(PathBuf),
    /// Re-run every step
    NoCache,
}

impl CacheMode {
    /// Build from the `--no-cache` / `--cachedir` flag pair.
    pub fn from_flags(no_cache: bool, cache_dir: &Path) -> Self {
        if no_cache {
            CacheMode::NoCache
        } else {
            CacheMode::Cache(cache_dir.to_path_buf())
        }
    }
}

/// Invoker for the external CWL runner.
pub struct CwlRunner<'a> {
    runner: &'a dyn CommandRunner,
    cache: CacheMode,
}

impl<'a> CwlRunner<'a> {
    pub fn new(runner: &'a dyn CommandRunner, cache: CacheMode) -> Self {
        Self { runner, cache }
    }

    /// Run `tool` through `cwl-runner` and return the recorded output path.
    pub async fn invoke(&self, tool: &Path, extra_args: &[String]) -> Result<PathBuf> {
        let mut args = Vec::new();
        if let CacheMode::Cache(dir) = &self.cache {
            args.push("--cachedir".to_string());
            args.push(dir.display().to_string());
        }
        args.push(tool.display().to_string());
        args.extend(extra_args.iter().cloned());

        info!("Running: {}", display_command("cwl-runner", &args));
        let stdout = self.runner.run("cwl-runner", &args).await?;

        let value: Value = serde_json::from_str(&stdout)
            .map_err(|e| Error::Runner(format!("cwl-runner output is not JSON: {}", e)))?;

        value
            .pointer("/OUTPUT/path")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .ok_or_else(|| {
                Error::Runner("cwl-runner output has no OUTPUT.path field".to_string())
            })
    }

    /// Run the challenge workflow against one tumor sample.
    pub async fn run_workflow(
        &self,
        tool: &Path,
        fastq1: &str,
        fastq2: &str,
        index_path: &Path,
    ) -> Result<PathBuf> {
        let args = vec![
            "--index".to_string(),
            index_path.display().to_string(),
            "--TUMOR_FASTQ_1".to_string(),
            fastq1.to_string(),
            "--TUMOR_FASTQ_2".to_string(),
            fastq2.to_string(),
        ];
        self.invoke(tool, &args).await
    }

    /// Run an evaluation workflow over a workflow's output.
    pub async fn run_evaluation(
        &self,
        tool: &Path,
        workflow_output: &Path,
        truth: &Path,
        annotations: Option<&Path>,
    ) -> Result<PathBuf> {
        let mut args = vec![
            "--input".to_string(),
            workflow_output.display().to_string(),
            "--truth".to_string(),
            truth.display().to_string(),
        ];
        if let Some(gtf) = annotations {
            args.push("--gtf".to_string());
            args.push(gtf.display().to_string());
        }
        self.invoke(tool, &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::MockRunner;

    #[tokio::test]
    async fn test_invoke_extracts_output_path() {
        let mock = MockRunner::new();
        mock.succeed_with("cwl-runner", r#"{"OUTPUT":{"path":"/x/y"}}"#);

        let cwl = CwlRunner::new(&mock, CacheMode::NoCache);
        let path = cwl.invoke(Path::new("wf.cwl"), &[]).await.unwrap();
        assert_eq!(path, PathBuf::from("/x/y"));
    }

    #[tokio::test]
    async fn test_invoke_prepends_cachedir() {
        let mock = MockRunner::new();
        mock.succeed_with("cwl-runner", r#"{"OUTPUT":{"path":"/out"}}"#);

        let cwl = CwlRunner::new(&mock, CacheMode::Cache(PathBuf::from("cwl-cache")));
        cwl.invoke(Path::new("wf.cwl"), &["job.json".to_string()])
            .await
            .unwrap();

        let calls = mock.calls_for("cwl-runner");
        assert_eq!(
            calls[0],
            vec!["cwl-runner", "--cachedir", "cwl-cache", "wf.cwl", "job.json"]
        );
    }

    #[tokio::test]
    async fn test_invoke_non_json_output_is_typed_error() {
        let mock = MockRunner::new();
        mock.succeed_with("cwl-runner", "Final process status is success\n");

        let cwl = CwlRunner::new(&mock, CacheMode::NoCache);
        let err = cwl.invoke(Path::new("wf.cwl"), &[]).await.unwrap_err();
        assert_eq!(err.code(), "RUNNER_ERROR");
        assert!(err.to_string().contains("not JSON"));
    }

    #[tokio::test]
    async fn test_invoke_missing_output_key() {
        let mock = MockRunner::new();
        mock.succeed_with("cwl-runner", r#"{"result": "ok"}"#);

        let cwl = CwlRunner::new(&mock, CacheMode::NoCache);
        let err = cwl.invoke(Path::new("wf.cwl"), &[]).await.unwrap_err();
        assert!(err.to_string().contains("OUTPUT.path"));
    }

    #[tokio::test]
    async fn test_run_workflow_argument_order() {
        let mock = MockRunner::new();
        mock.succeed_with("cwl-runner", r#"{"OUTPUT":{"path":"/out.bedpe"}}"#);

        let cwl = CwlRunner::new(&mock, CacheMode::NoCache);
        cwl.run_workflow(
            Path::new("smc.cwl"),
            "s1_1.fq.gz",
            "s1_2.fq.gz",
            Path::new("/data/index.tar"),
        )
        .await
        .unwrap();

        let calls = mock.calls_for("cwl-runner");
        assert_eq!(
            calls[0],
            vec![
                "cwl-runner",
                "smc.cwl",
                "--index",
                "/data/index.tar",
                "--TUMOR_FASTQ_1",
                "s1_1.fq.gz",
                "--TUMOR_FASTQ_2",
                "s1_2.fq.gz",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_evaluation_optional_gtf() {
        let mock = MockRunner::new();
        mock.succeed_with("cwl-runner", r#"{"OUTPUT":{"path":"/score"}}"#);
        mock.succeed_with("cwl-runner", r#"{"OUTPUT":{"path":"/score"}}"#);

        let cwl = CwlRunner::new(&mock, CacheMode::NoCache);
        cwl.run_evaluation(
            Path::new("eval.cwl"),
            Path::new("/out.bedpe"),
            Path::new("/truth.bedpe"),
            None,
        )
        .await
        .unwrap();
        cwl.run_evaluation(
            Path::new("eval.cwl"),
            Path::new("/out.tsv"),
            Path::new("/truth.txt"),
            Some(Path::new("/ref.gtf")),
        )
        .await
        .unwrap();

        let calls = mock.calls_for("cwl-runner");
        assert!(!calls[0].contains(&"--gtf".to_string()));
        assert!(calls[1].ends_with(&["--gtf".to_string(), "/ref.gtf".to_string()]));
    }
}
