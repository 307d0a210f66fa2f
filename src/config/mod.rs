//! Configuration management.
//!
//! dream-runner configuration can come from:
//! - Environment variables (DREAM_*)
//! - Config file (~/.config/dream-runner/config.toml)
//! - Per-invocation CLI overrides (e.g. `--bucket`)
//!
//! The bucket and cache directory are threaded through call parameters rather
//! than held in process globals, so two invocations with different overrides
//! never observe each other.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed reference file set: logical name to canonical filename.
///
/// These files live gzipped at the bucket root and are expected uncompressed
/// in the working directory.
pub const REFERENCE_DATA: [(&str, &str); 2] = [
    (
        "REFERENCE_GENOME",
        "Homo_sapiens.GRCh37.75.dna_sm.primary_assembly.fa",
    ),
    ("REFERENCE_GTF", "Homo_sapiens.GRCh37.75.gtf"),
];

/// Per-dataset file suffixes expected locally after a download.
pub const FILE_SUFFIXES: [&str; 4] = [
    "_filtered.bedpe",
    "_isoforms_truth.txt",
    "_mergeSort_1.fq.gz",
    "_mergeSort_2.fq.gz",
];

/// dream-runner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// CWL runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Data portal integration
    #[serde(default)]
    pub portal: PortalConfig,
}

/// Remote storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Challenge bucket holding reference and dataset files
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
        }
    }
}

fn default_bucket() -> String {
    "gs://dream-smc-rna".to_string()
}

/// CWL runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Directory for cached workflow steps
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Root directory holding the evaluation workflow checkouts
    /// (FusionDetection/, IsoformQuantification/)
    #[serde(default = "default_workflow_root")]
    pub workflow_root: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            workflow_root: default_workflow_root(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cwl-cache")
}

fn default_workflow_root() -> PathBuf {
    PathBuf::from("..")
}

/// Data portal integration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal client command to shell out to
    #[serde(default = "default_portal_command")]
    pub command: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            command: default_portal_command(),
        }
    }
}

fn default_portal_command() -> String {
    "synapse".to_string()
}

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Self {
        let mut config = Self::default();

        let path = Self::config_dir().join("config.toml");
        if let Ok(partial) = Self::load_partial_from_path(&path) {
            config.apply_partial(partial);
        }

        config.apply_env_overrides();
        config
    }

    /// Get the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("dream-runner"))
            .unwrap_or_else(|| PathBuf::from(".dream-runner"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var("DREAM_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Ok(dir) = std::env::var("DREAM_CACHE_DIR") {
            self.runner.cache_dir = PathBuf::from(dir);
        }
        if let Ok(root) = std::env::var("DREAM_WORKFLOW_ROOT") {
            self.runner.workflow_root = PathBuf::from(root);
        }
        if let Ok(cmd) = std::env::var("DREAM_PORTAL_COMMAND") {
            self.portal.command = cmd;
        }
    }

    fn load_partial_from_path(path: &Path) -> std::result::Result<PartialConfig, ()> {
        let content = std::fs::read_to_string(path).map_err(|_| ())?;
        toml::from_str(&content).map_err(|_| ())
    }

    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(storage) = partial.storage {
            self.storage = storage;
        }
        if let Some(runner) = partial.runner {
            self.runner = runner;
        }
        if let Some(portal) = partial.portal {
            self.portal = portal;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    storage: Option<StorageConfig>,
    runner: Option<RunnerConfig>,
    portal: Option<PortalConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.bucket, "gs://dream-smc-rna");
        assert_eq!(config.runner.cache_dir, PathBuf::from("cwl-cache"));
        assert_eq!(config.portal.command, "synapse");
    }

    #[test]
    fn test_partial_toml() {
        let partial: PartialConfig = toml::from_str(
            r#"
[storage]
bucket = "gs://my-bucket"
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_partial(partial);
        assert_eq!(config.storage.bucket, "gs://my-bucket");
        // Untouched sections keep their defaults
        assert_eq!(config.portal.command, "synapse");
    }

    #[test]
    fn test_reference_data_is_fixed() {
        assert_eq!(REFERENCE_DATA.len(), 2);
        assert_eq!(FILE_SUFFIXES.len(), 4);
        assert!(FILE_SUFFIXES.contains(&"_mergeSort_1.fq.gz"));
    }
}
