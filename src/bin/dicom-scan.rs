//! Print selected DICOM header fields for every image in a directory.
//!
//! The DICOM format itself stays a black box: each file is handed to an
//! external dumper that emits the DICOM JSON model, and only six well-known
//! tags are picked out of it.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dream_runner::process::{CommandRunner, SystemRunner};

/// Labels printed per file, with their DICOM JSON model tags.
const HEADER_FIELDS: [(&str, &str); 6] = [
    ("PatientID", "00100020"),
    ("StudyDate", "00080020"),
    ("PatientAge", "00101010"),
    ("SeriesDescription", "0008103E"),
    ("Rows", "00280010"),
    ("Columns", "00280011"),
];

#[derive(Parser)]
#[command(name = "dicom-scan")]
#[command(about = "List header fields of the DICOM images in a directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory of .dcm files
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// External command that dumps a DICOM file as JSON
    #[arg(long, default_value = "dcm2json")]
    dumper: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dream_runner=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let runner = SystemRunner;

    let mut entries: Vec<PathBuf> = std::fs::read_dir(&cli.dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_dicom_file(path))
        .collect();
    entries.sort();

    for path in entries {
        match describe_file(&runner, &cli.dumper, &path).await {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }

    Ok(())
}

/// Case-insensitive `.dcm` filename check.
fn is_dicom_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().contains(".dcm"))
        .unwrap_or(false)
}

/// One output line: file name, size, and the selected header fields.
async fn describe_file(
    runner: &dyn CommandRunner,
    dumper: &str,
    path: &Path,
) -> anyhow::Result<String> {
    let size_mb = std::fs::metadata(path)?.len() / 1_024_000;

    let stdout = runner
        .run(dumper, &[path.display().to_string()])
        .await?;
    let headers: Value = serde_json::from_str(&stdout)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(format!(
        "{}: file size (MB): {}, {}",
        name,
        size_mb,
        format_fields(&headers)
    ))
}

/// Render the six selected fields in a fixed order.
fn format_fields(headers: &Value) -> String {
    HEADER_FIELDS
        .iter()
        .map(|(label, tag)| format!("{}: {}", label, field_value(headers, tag)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// First value of a tag in the DICOM JSON model; empty when absent.
fn field_value(headers: &Value, tag: &str) -> String {
    match headers.pointer(&format!("/{}/Value/0", tag)) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
