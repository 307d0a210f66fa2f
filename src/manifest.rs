//! Workflow input manifest assembly.
//!
//! The manifest maps workflow parameter names to local files: one entry per
//! `synData` hint of the descriptor, the two paired-read files of the
//! dataset, and every reference file. Building it downloads whatever is
//! missing, so it is not a read-only operation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::REFERENCE_DATA;
use crate::cwl::CwlDocument;
use crate::error::Result;
use crate::fetch::{DataFetcher, DatasetId};
use crate::portal::PortalSession;

/// A CWL file descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRef {
    pub class: String,
    pub path: PathBuf,
}

impl FileRef {
    pub fn file(path: PathBuf) -> Self {
        Self {
            class: "File".to_string(),
            path,
        }
    }
}

/// Mapping from workflow parameter name to file descriptor.
///
/// Built fresh per invocation and written once; entries are kept sorted so
/// the serialized form is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputManifest {
    #[serde(flatten)]
    entries: BTreeMap<String, FileRef>,
}

impl InputManifest {
    /// Assemble the manifest for one dataset and workflow descriptor.
    ///
    /// Side effect: ensures the dataset files are cached locally before the
    /// paired-read entries are added.
    pub async fn build(
        portal: &PortalSession<'_>,
        fetcher: &DataFetcher<'_>,
        doc: &CwlDocument,
        dataset: &DatasetId,
        dir: &Path,
    ) -> Result<Self> {
        // Workflow-declared auxiliary inputs; resolution failures propagate
        // before any download is attempted.
        let mut custom_inputs = Vec::new();
        for (input, entity) in doc.syn_data_hints() {
            let path = portal.get(entity).await?;
            custom_inputs.push((input.to_string(), FileRef::file(path)));
        }

        fetcher.ensure_dataset(dataset, dir).await?;

        let mut entries = BTreeMap::new();
        entries.insert(
            "TUMOR_FASTQ_1".to_string(),
            FileRef::file(absolute(&dataset.local_file(dir, "_mergeSort_1.fq.gz"))?),
        );
        entries.insert(
            "TUMOR_FASTQ_2".to_string(),
            FileRef::file(absolute(&dataset.local_file(dir, "_mergeSort_2.fq.gz"))?),
        );

        for (name, filename) in REFERENCE_DATA {
            entries.insert(name.to_string(), FileRef::file(absolute(&dir.join(filename))?));
        }

        // Hints go in last: a hint reusing a fixed parameter name wins.
        for (name, file_ref) in custom_inputs {
            entries.insert(name, file_ref);
        }

        Ok(Self { entries })
    }

    /// Write the manifest to a uniquely named JSON file under `dir`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("dream_runner_input_{}.json", Uuid::new_v4()));
        std::fs::write(&path, serde_json::to_string(self)?)?;
        Ok(path)
    }

    /// Pretty-printed JSON form.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FileRef> {
        self.entries.get(name)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
