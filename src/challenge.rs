//! Challenge selection.
//!
//! The two scoring modes differ in evaluation workflow, truth-file suffix,
//! and where the annotation file comes from. Unknown values never reach a
//! handler: clap rejects them at parse time.

use std::path::{Path, PathBuf};

use clap::ValueEnum;

/// Scoring mode for the `test` and `inputs` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Challenge {
    /// Fusion detection
    Fusion,
    /// Isoform quantification
    Isoform,
}

/// Where a challenge's annotation file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationSource {
    /// A fixed portal entity, resolved at evaluation time
    PortalEntity(&'static str),
    /// A file expected in the working directory
    LocalFile(&'static str),
}

impl Challenge {
    /// Evaluation workflow file, relative to the workflow checkout root.
    pub fn eval_workflow(&self, root: &Path) -> PathBuf {
        match self {
            Challenge::Fusion => root
                .join("FusionDetection")
                .join("cwl")
                .join("FusionEvalWorkflow.cwl"),
            Challenge::Isoform => root
                .join("IsoformQuantification")
                .join("cwl")
                .join("QuantificationEvalWorkflow.cwl"),
        }
    }

    /// Truth-file suffix appended to the dataset identifier.
    pub fn truth_suffix(&self) -> &'static str {
        match self {
            Challenge::Fusion => "_filtered.bedpe",
            Challenge::Isoform => "_isoforms_truth.txt",
        }
    }

    /// Annotation source for the evaluation invocation.
    pub fn annotations(&self) -> AnnotationSource {
        match self {
            Challenge::Fusion => AnnotationSource::PortalEntity("syn5908245"),
            Challenge::Isoform => AnnotationSource::LocalFile("Homo_sapiens.GRCh37.75.gtf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_workflow_paths() {
        let root = Path::new("/checkouts");
        assert_eq!(
            Challenge::Fusion.eval_workflow(root),
            PathBuf::from("/checkouts/FusionDetection/cwl/FusionEvalWorkflow.cwl")
        );
        assert_eq!(
            Challenge::Isoform.eval_workflow(root),
            PathBuf::from("/checkouts/IsoformQuantification/cwl/QuantificationEvalWorkflow.cwl")
        );
    }

    #[test]
    fn test_truth_suffixes() {
        assert_eq!(Challenge::Fusion.truth_suffix(), "_filtered.bedpe");
        assert_eq!(Challenge::Isoform.truth_suffix(), "_isoforms_truth.txt");
    }

    #[test]
    fn test_annotation_sources() {
        assert_eq!(
            Challenge::Fusion.annotations(),
            AnnotationSource::PortalEntity("syn5908245")
        );
        assert_eq!(
            Challenge::Isoform.annotations(),
            AnnotationSource::LocalFile("Homo_sapiens.GRCh37.75.gtf")
        );
    }

    #[test]
    fn test_unknown_challenge_rejected_at_parse() {
        assert!(Challenge::from_str("fusion", true).is_ok());
        assert!(Challenge::from_str("isoform", true).is_ok());
        assert!(Challenge::from_str("fusionQuant", true).is_err());
    }
}
