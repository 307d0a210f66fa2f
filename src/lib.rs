//! dream-runner - run SMC-RNA challenge workflows from beginning to end.
//!
//! A thin orchestration layer over three external tools: the data-portal
//! client (entity resolution), the cloud storage CLI (dataset and reference
//! downloads), and the CWL runner (workflow and evaluation execution). All
//! of them are invoked as black boxes through the [`process::CommandRunner`]
//! seam; this crate owns only the wiring between them.
//!
//! ## Example
//!
//! ```text
//! dream-runner download sim1 --dir ./data
//! dream-runner test sim1 my-workflow.cwl fusion --dir ./data
//! ```

pub mod challenge;
pub mod config;
pub mod cwl;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod portal;
pub mod process;
pub mod runner;

pub use error::{Error, Result};
