//! CWL YAML parser.

use std::path::Path;

use super::types::CwlDocument;
use crate::error::{Error, Result};

/// Parse a CWL document from a YAML string.
pub fn parse_cwl(yaml: &str) -> Result<CwlDocument> {
    if yaml.trim().is_empty() {
        return Err(Error::Cwl("Empty CWL document".to_string()));
    }

    let doc: CwlDocument = serde_yaml::from_str(yaml)
        .map_err(|e| Error::Cwl(format!("Must be a CWL file (YAML format): {}", e)))?;
    Ok(doc)
}

/// Parse a CWL document from a file path.
pub fn parse_cwl_file(path: &Path) -> Result<CwlDocument> {
    let content = std::fs::read_to_string(path)?;
    parse_cwl(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_packed_document() {
        let yaml = r#"
cwlVersion: v1.0
$graph:
  - id: main
    class: Workflow
    hints:
      - class: synData
        entity: syn123456
        input: index
  - id: align
    class: CommandLineTool
"#;

        let doc = parse_cwl(yaml).unwrap();
        assert_eq!(doc.graph.len(), 2);

        let workflow = doc.workflow_node().unwrap();
        assert_eq!(workflow.hints.len(), 1);
        assert_eq!(workflow.hints[0].entity.as_deref(), Some("syn123456"));
    }

    #[test]
    fn test_parse_top_level_hints() {
        let yaml = r#"
cwlVersion: v1.0
class: Workflow
hints:
  - class: synData
    entity: syn987
    input: STAR_INDEX
  - class: ResourceRequirement
    entity: ignored
"#;

        let doc = parse_cwl(yaml).unwrap();
        let hints: Vec<_> = doc.syn_data_hints().collect();
        assert_eq!(hints, vec![("STAR_INDEX", "syn987")]);
    }

    #[test]
    fn test_syn_data_hint_without_input_is_skipped() {
        let yaml = r#"
hints:
  - class: synData
    entity: syn42
"#;

        let doc = parse_cwl(yaml).unwrap();
        assert_eq!(doc.syn_data_hints().count(), 0);
    }

    #[test]
    fn test_parse_empty_document() {
        let result = parse_cwl("   \n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Empty CWL"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_cwl("$graph: [broken");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Must be a CWL file"));
    }
}
