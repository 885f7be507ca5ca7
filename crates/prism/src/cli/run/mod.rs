//! The `prism run` command: push a batch of images through the pipeline.

mod report;
mod setup;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use prism_core::{BatchPipeline, Config};

use report::{create_progress_bar, print_summary};
use setup::{apply_overrides, resolve_inputs};

/// Arguments for the `run` command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Image files or directories (defaults to `batch.inputs` from config)
    pub inputs: Vec<PathBuf>,

    /// Prefix identifying the input tree
    #[arg(long)]
    pub input_root: Option<String>,

    /// Replacement prefix for output paths
    #[arg(long)]
    pub output_root: Option<String>,

    /// Target width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Rotation angles in degrees, comma separated
    #[arg(long, value_delimiter = ',')]
    pub angles: Option<Vec<u32>>,

    /// Capacity of each inter-stage channel
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Output encoding
    #[arg(long, value_enum)]
    pub format: Option<SaveFormat>,

    /// Print a JSON report on stdout instead of the summary table
    #[arg(long)]
    pub json: bool,

    /// Exit successfully even when some items failed
    #[arg(long)]
    pub allow_failures: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Output encodings selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SaveFormat {
    /// JPEG at the configured quality
    Jpeg,
    /// Lossless PNG
    Png,
    /// Encoding chosen from each output's extension
    Auto,
}

impl std::fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveFormat::Jpeg => write!(f, "jpeg"),
            SaveFormat::Png => write!(f, "png"),
            SaveFormat::Auto => write!(f, "auto"),
        }
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    let inputs = resolve_inputs(&args, &config);
    if inputs.is_empty() {
        tracing::warn!("No inputs to process");
        return Ok(());
    }

    let pipeline = BatchPipeline::new(&config);
    let expected = (inputs.len() * pipeline.angles().len()) as u64;
    let progress = create_progress_bar(expected, args.json || args.no_progress);

    let summary = pipeline
        .run_with(inputs, |saved| {
            progress.inc(1);
            progress.set_message(saved.out_path.display().to_string());
        })
        .await?;
    progress.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary.report())?);
    } else {
        print_summary(&summary, pipeline.angles().len());
    }

    if !summary.is_clean() && !args.allow_failures {
        anyhow::bail!(
            "{} item(s) failed ({} load, {} transform, {} save)",
            summary.failed(),
            summary.load_failures.len(),
            summary.transform_failures.len(),
            summary.save_failures.len()
        );
    }

    Ok(())
}
