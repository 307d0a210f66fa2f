//! CWL descriptor type definitions.
//!
//! Only the slice of CWL this wrapper actually reads is modeled: the
//! `$graph` node list and the `hints` entries that reference portal data.
//! Everything else in the document is opaque to us and belongs to the
//! external runner.

use serde::{Deserialize, Serialize};

/// A parsed CWL document.
///
/// Packed documents carry a `$graph` list of process nodes; unpacked
/// documents may carry `hints` at the top level. Both forms are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CwlDocument {
    /// Process nodes of a packed document
    #[serde(rename = "$graph", default)]
    pub graph: Vec<GraphNode>,

    /// Top-level hints of an unpacked document
    #[serde(default)]
    pub hints: Vec<Hint>,
}

/// A node of the `$graph` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Process class, e.g. "Workflow" or "CommandLineTool"
    #[serde(default)]
    pub class: Option<String>,

    #[serde(default)]
    pub hints: Vec<Hint>,
}

/// A workflow hint.
///
/// Hints of class `synData` declare an auxiliary input backed by a portal
/// entity; all other hint classes are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hint {
    #[serde(default)]
    pub class: Option<String>,

    /// Portal entity ID the hint resolves to
    #[serde(default)]
    pub entity: Option<String>,

    /// Workflow input name the resolved file is bound to
    #[serde(default)]
    pub input: Option<String>,
}

impl Hint {
    /// Whether this hint declares portal-backed data.
    pub fn is_syn_data(&self) -> bool {
        self.class.as_deref() == Some("synData")
    }
}

impl CwlDocument {
    /// The `$graph` node of class "Workflow", if any.
    pub fn workflow_node(&self) -> Option<&GraphNode> {
        self.graph
            .iter()
            .find(|node| node.class.as_deref() == Some("Workflow"))
    }

    /// Top-level `synData` hints with both an entity and an input name.
    pub fn syn_data_hints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.hints.iter().filter_map(|hint| {
            if !hint.is_syn_data() {
                return None;
            }
            match (hint.input.as_deref(), hint.entity.as_deref()) {
                (Some(input), Some(entity)) => Some((input, entity)),
                _ => None,
            }
        })
    }
}
