//! Remote data fetching.
//!
//! Dataset and reference files live in a cloud bucket and are copied down
//! with the storage CLI. Fetching is idempotent on file existence only; a
//! present file is trusted without any integrity check.

use std::path::{Path, PathBuf};

use regex_lite::Regex;
use tracing::info;

use crate::config::{FILE_SUFFIXES, REFERENCE_DATA};
use crate::error::{Error, Result};
use crate::process::CommandRunner;

/// A training or debugging sample set identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetId(String);

impl DatasetId {
    /// Validate a raw identifier. Only `sim*` and `dryrun*` names address a
    /// known remote directory.
    pub fn new(id: &str) -> Result<Self> {
        if id.starts_with("sim") || id.starts_with("dryrun") {
            Ok(Self(id.to_string()))
        } else {
            Err(Error::Validation(format!(
                "Unknown dataset '{}': expected a 'sim*' training set or a 'dryrun*' debugging set",
                id
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Remote directory for this dataset's files.
    pub fn remote_prefix(&self) -> &'static str {
        if self.0.starts_with("sim") {
            "training"
        } else {
            "debugging"
        }
    }

    /// Path of one expected local file for this dataset.
    pub fn local_file(&self, dir: &Path, suffix: &str) -> PathBuf {
        dir.join(format!("{}{}", self.0, suffix))
    }
}

/// Copies remote objects into a local directory via the storage CLI.
pub struct DataFetcher<'a> {
    runner: &'a dyn CommandRunner,
    bucket: String,
}

impl<'a> DataFetcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, bucket: &str) -> Self {
        Self {
            runner,
            bucket: bucket.to_string(),
        }
    }

    /// Verify the storage session by listing the bucket.
    ///
    /// The storage CLI holds its own credentials; all we can do is probe and
    /// point the user at the login command when the probe fails.
    pub async fn ensure_authenticated(&self) -> Result<()> {
        self.runner
            .run("gsutil", &["ls".to_string(), self.bucket.clone()])
            .await
            .map_err(|_| {
                Error::Auth(format!(
                    "You are not logged in to gcloud. Please login by doing 'gcloud auth login' \
                     and follow the steps to have access to {}",
                    self.bucket
                ))
            })?;
        Ok(())
    }

    /// Make sure every expected file of `dataset` exists under `dir`.
    ///
    /// Verifies the storage session first, so callers reaching downloads
    /// through a manifest build still get the login remediation. Files
    /// already present are skipped; each missing one triggers a copy of the
    /// dataset's remote glob.
    pub async fn ensure_dataset(&self, dataset: &DatasetId, dir: &Path) -> Result<()> {
        self.ensure_authenticated().await?;

        info!("Caching input files for {}", dataset.as_str());
        for suffix in FILE_SUFFIXES {
            let local_path = dataset.local_file(dir, suffix);
            if local_path.exists() {
                continue;
            }
            let remote = format!(
                "{}/{}/{}_*",
                self.bucket,
                dataset.remote_prefix(),
                dataset.as_str()
            );
            self.copy(&remote, dir).await?;
        }
        Ok(())
    }

    /// Make sure every reference file exists under `dir`, downloading and
    /// decompressing the missing ones.
    pub async fn ensure_references(&self, dir: &Path) -> Result<()> {
        for (_, filename) in REFERENCE_DATA {
            if dir.join(filename).exists() {
                continue;
            }
            let remote = format!("{}/{}.gz", self.bucket, filename);
            self.copy(&remote, dir).await?;

            let archive = dir.join(format!("{}.gz", filename));
            self.runner
                .run("gunzip", &[archive.display().to_string()])
                .await?;
        }
        Ok(())
    }

    /// List available tumor datasets by scanning the training directory.
    pub async fn list_datasets(&self) -> Result<Vec<String>> {
        let remote = format!("{}/training/*.fq.gz", self.bucket);
        let stdout = self
            .runner
            .run("gsutil", &["ls".to_string(), remote])
            .await?;

        let pattern = Regex::new(r"(sim.*)_merge").expect("dataset pattern is valid");
        let mut out: Vec<String> = Vec::new();
        for line in stdout.lines() {
            if !line.starts_with("gs://") {
                continue;
            }
            if let Some(found) = pattern.captures(line).and_then(|c| c.get(1)) {
                let name = found.as_str().to_string();
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        Ok(out)
    }

    async fn copy(&self, remote: &str, dir: &Path) -> Result<()> {
        let args = vec![
            "cp".to_string(),
            remote.to_string(),
            dir.display().to_string(),
        ];
        info!("Copying {}", remote);
        self.runner.run("gsutil", &args).await?;
        Ok(())
    }
}
