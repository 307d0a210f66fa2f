use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dream_runner::challenge::{AnnotationSource, Challenge};
use dream_runner::config::Config;
use dream_runner::cwl::{find_portal_entity, parse_cwl_file, validate_cwl};
use dream_runner::fetch::{DataFetcher, DatasetId};
use dream_runner::manifest::InputManifest;
use dream_runner::portal::PortalSession;
use dream_runner::process::{CommandRunner, SystemRunner};
use dream_runner::runner::{CacheMode, CwlRunner};

#[derive(Parser)]
#[command(name = "dream-runner")]
#[command(about = "DREAM runner - run your workflow from beginning to end", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run workflow and evaluation framework
    Run {
        /// CWL workflow file
        #[arg(long, default_value = "smc-tophat-workflow.cwl")]
        workflow_cwl: PathBuf,
        /// CWL evaluation workflow file
        #[arg(long, default_value = "eval-workflow.cwl")]
        eval_cwl: PathBuf,
        /// First tumor FASTQ file
        #[arg(long, default_value = "sim1a_30m_merged_1.fq.gz")]
        fastq1: String,
        /// Second tumor FASTQ file
        #[arg(long, default_value = "sim1a_30m_merged_2.fq.gz")]
        fastq2: String,
        /// Truth file for scoring
        #[arg(long, default_value = "truth.bedpe")]
        truth: PathBuf,
        /// Annotation file for scoring
        #[arg(long, default_value = "ensembl.hg19.txt")]
        annotations: PathBuf,
        /// Storage bucket override
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Download training and dry-run data
    Download {
        /// Training or debugging dataset to download
        input: String,
        /// Directory to download files to
        #[arg(long, default_value = "./")]
        dir: PathBuf,
        /// Storage bucket override
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Download inputs and run workflow plus evaluation for one challenge
    Test {
        /// Training or debugging dataset to use
        input: String,
        /// Non-merged workflow file
        workflow: PathBuf,
        /// Challenge question: fusion or isoform
        #[arg(value_enum)]
        challenge: Challenge,
        /// Directory to download data to
        #[arg(long, default_value = "./")]
        dir: PathBuf,
        /// Do not cache workflow steps
        #[arg(long)]
        no_cache: bool,
        /// Directory to cache CWL runs
        #[arg(long)]
        cachedir: Option<PathBuf>,
        /// Storage bucket override
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Create the input JSON for a workflow
    Inputs {
        /// Training or debugging dataset to use
        input: String,
        /// Non-merged workflow file
        workflow: PathBuf,
        /// Challenge question: fusion or isoform
        #[arg(value_enum)]
        challenge: Challenge,
        /// Directory to download data to
        #[arg(long, default_value = "./")]
        dir: PathBuf,
        /// Do not cache workflow steps (accepted for parity with `test`)
        #[arg(long)]
        no_cache: bool,
        /// Directory to cache CWL runs (accepted for parity with `test`)
        #[arg(long)]
        cachedir: Option<PathBuf>,
        /// Storage bucket override
        #[arg(long)]
        bucket: Option<String>,
    },
    /// List available tumor datasets
    List {
        /// Storage bucket override
        #[arg(long)]
        bucket: Option<String>,
    },
}

impl Commands {
    fn bucket_override(&self) -> Option<&str> {
        match self {
            Commands::Run { bucket, .. }
            | Commands::Download { bucket, .. }
            | Commands::Test { bucket, .. }
            | Commands::Inputs { bucket, .. }
            | Commands::List { bucket, .. } => bucket.as_deref(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dream_runner=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(bucket) = cli.command.bucket_override() {
        config.storage.bucket = bucket.to_string();
    }

    let runner = SystemRunner;
    let session = PortalSession::login(&runner, &config.portal).await?;

    match cli.command {
        Commands::Run {
            workflow_cwl,
            eval_cwl,
            fastq1,
            fastq2,
            truth,
            annotations,
            ..
        } => {
            cmd_run(
                &config,
                &runner,
                &session,
                &workflow_cwl,
                &eval_cwl,
                &fastq1,
                &fastq2,
                &truth,
                &annotations,
            )
            .await?
        }
        Commands::Download { input, dir, .. } => cmd_download(&config, &runner, &input, &dir).await?,
        Commands::Test {
            input,
            workflow,
            challenge,
            dir,
            no_cache,
            cachedir,
            ..
        } => {
            let cache = CacheMode::from_flags(
                no_cache,
                cachedir.as_deref().unwrap_or(&config.runner.cache_dir),
            );
            cmd_test(
                &config, &runner, &session, &input, &workflow, challenge, &dir, cache,
            )
            .await?
        }
        Commands::Inputs {
            input,
            workflow,
            dir,
            // Cache flags are accepted but have no effect: nothing runs here
            no_cache: _,
            cachedir: _,
            ..
        } => cmd_inputs(&config, &runner, &session, &input, &workflow, &dir).await?,
        Commands::List { .. } => cmd_list(&config, &runner).await?,
    }

    Ok(())
}

// ============================================================================
// Command handlers
// ============================================================================

/// Validate a workflow, run it against the configured sample, then score it.
#[allow(clippy::too_many_arguments)]
async fn cmd_run(
    config: &Config,
    runner: &dyn CommandRunner,
    session: &PortalSession<'_>,
    workflow_cwl: &Path,
    eval_cwl: &Path,
    fastq1: &str,
    fastq2: &str,
    truth: &Path,
    annotations: &Path,
) -> anyhow::Result<()> {
    validate_cwl(runner, workflow_cwl).await?;
    let doc = parse_cwl_file(workflow_cwl)?;
    let entity = find_portal_entity(&doc)?;
    info!("Portal entity: {}", entity);

    let index = session.get(&entity).await?;

    let cwl = CwlRunner::new(
        runner,
        CacheMode::Cache(config.runner.cache_dir.clone()),
    );
    let workflow_out = cwl
        .run_workflow(workflow_cwl, fastq1, fastq2, &index)
        .await?;
    cwl.run_evaluation(eval_cwl, &workflow_out, truth, Some(annotations))
        .await?;

    Ok(())
}

/// Cache a dataset's files locally, skipping ones already present.
async fn cmd_download(
    config: &Config,
    runner: &dyn CommandRunner,
    input: &str,
    dir: &Path,
) -> anyhow::Result<()> {
    let dataset = DatasetId::new(input)?;
    let fetcher = DataFetcher::new(runner, &config.storage.bucket);

    // ensure_dataset probes storage auth before copying anything
    fetcher.ensure_dataset(&dataset, dir).await?;

    Ok(())
}

/// Full challenge test: fetch everything, run the workflow, evaluate it.
#[allow(clippy::too_many_arguments)]
async fn cmd_test(
    config: &Config,
    runner: &dyn CommandRunner,
    session: &PortalSession<'_>,
    input: &str,
    workflow: &Path,
    challenge: Challenge,
    dir: &Path,
    cache: CacheMode,
) -> anyhow::Result<()> {
    let dataset = DatasetId::new(input)?;
    let fetcher = DataFetcher::new(runner, &config.storage.bucket);
    fetcher.ensure_authenticated().await?;

    if !dir.exists() {
        info!("Making directory {}", dir.display());
        std::fs::create_dir_all(dir)?;
    }

    fetcher.ensure_references(dir).await?;

    let doc = parse_cwl_file(workflow)?;
    let manifest = InputManifest::build(session, &fetcher, &doc, &dataset, dir).await?;
    println!("{}", manifest.to_pretty_json()?);
    let manifest_path = manifest.write(dir)?;

    let cwl = CwlRunner::new(runner, cache);
    let workflow_out = cwl
        .invoke(workflow, &[manifest_path.display().to_string()])
        .await?;

    let eval_cwl = challenge.eval_workflow(&config.runner.workflow_root);
    let truth = std::path::absolute(dataset.local_file(dir, challenge.truth_suffix()))?;
    let annotations = match challenge.annotations() {
        AnnotationSource::PortalEntity(entity) => session.get(entity).await?,
        AnnotationSource::LocalFile(filename) => std::path::absolute(dir.join(filename))?,
    };

    cwl.run_evaluation(&eval_cwl, &workflow_out, &truth, Some(&annotations))
        .await?;

    Ok(())
}

/// Assemble and print the input manifest without running anything.
async fn cmd_inputs(
    config: &Config,
    runner: &dyn CommandRunner,
    session: &PortalSession<'_>,
    input: &str,
    workflow: &Path,
    dir: &Path,
) -> anyhow::Result<()> {
    let dataset = DatasetId::new(input)?;
    let fetcher = DataFetcher::new(runner, &config.storage.bucket);

    let doc = parse_cwl_file(workflow)?;
    let manifest = InputManifest::build(session, &fetcher, &doc, &dataset, dir).await?;
    println!("{}", manifest.to_pretty_json()?);

    Ok(())
}

/// Print the datasets available in the training directory.
async fn cmd_list(config: &Config, runner: &dyn CommandRunner) -> anyhow::Result<()> {
    let fetcher = DataFetcher::new(runner, &config.storage.bucket);
    for dataset in fetcher.list_datasets().await? {
        println!("{}", dataset);
    }
    Ok(())
}
