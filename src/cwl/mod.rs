//! CWL descriptor handling.
//!
//! The descriptor is consumed, never produced: we read it to discover
//! portal-backed auxiliary inputs and hand the file itself to the external
//! runner untouched.

mod parser;
mod types;

pub use parser::{parse_cwl, parse_cwl_file};
pub use types::{CwlDocument, GraphNode, Hint};

use std::path::Path;

use crate::error::{Error, Result};
use crate::process::CommandRunner;

/// Syntactically validate a CWL file by asking `cwltool` to preprocess it.
pub async fn validate_cwl(runner: &dyn CommandRunner, path: &Path) -> Result<()> {
    let args = vec!["--print-pre".to_string(), path.display().to_string()];
    runner
        .run("cwltool", &args)
        .await
        .map_err(|e| Error::Cwl(format!("Your CWL file is not formatted correctly: {}", e)))?;
    Ok(())
}

/// Find the portal entity declared by the `$graph` Workflow node.
///
/// This is the workflow's index archive, declared as the first hint of the
/// Workflow node in a packed document.
pub fn find_portal_entity(doc: &CwlDocument) -> Result<String> {
    let workflow = doc
        .workflow_node()
        .ok_or_else(|| Error::Cwl("No Workflow node in $graph".to_string()))?;

    workflow
        .hints
        .first()
        .and_then(|hint| hint.entity.clone())
        .ok_or_else(|| Error::Cwl("Workflow node declares no data hint".to_string()))
}
