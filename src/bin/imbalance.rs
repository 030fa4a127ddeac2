//! CLI entry point for imbalance-correction sweeps.
//!
//! Runs every selected classifier without correction at each ratio, then
//! with each selected correction, and writes the corrected table, the
//! uncorrected table, the ROC chart and a run manifest to the output
//! directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::Parser;
use tracing::{info, warn};
use trueno_imbalance::classifier::Subset;
use trueno_imbalance::dataset::Dataset;
use trueno_imbalance::manifest::{RunManifest, SweepStatus, MANIFEST_FILE};
use trueno_imbalance::options::Options;
use trueno_imbalance::ratio::RatioSpec;
use trueno_imbalance::results::ResultStore;
use trueno_imbalance::sweep::{
    classifier_choices, correction_choices, DatasetRunner, ParameterSweeper, SweepPlan,
};
use trueno_imbalance::Error;

#[derive(Parser, Debug)]
#[command(name = "imbalance", about = "Imbalance correction analysis", version)]
struct Cli {
    /// Correction technique, ALL-OVER, ALL-COMBINED or NONE.
    #[arg(
        short = 'a',
        long,
        default_value = "smote",
        ignore_case = true,
        value_parser = PossibleValuesParser::new(correction_choices())
    )]
    algorithm: String,

    /// Classification technique or ALL.
    #[arg(
        short = 'c',
        long,
        default_value = "logistic",
        ignore_case = true,
        value_parser = PossibleValuesParser::new(classifier_choices())
    )]
    classifier: String,

    /// Output directory.
    #[arg(short = 'd', long, default_value = ".")]
    directory: PathBuf,

    /// Dataset (CSV or Parquet).
    #[arg(short = 'f', long)]
    data: PathBuf,

    /// Options file.
    #[arg(short = 'i', long, default_value = "options.toml")]
    ini: PathBuf,

    /// Crop:weed ratio, fixed (10:1) or a range (10:1-10). 0:0 keeps the natural ratio.
    #[arg(short = 'r', long, default_value = "0:0")]
    ratio: String,

    /// Steps within a ratio range.
    #[arg(short = 'n', long, default_value = "5")]
    steps: usize,

    /// Output CSV; the uncorrected table is written as uncorrected-<output>.
    #[arg(short = 'o', long, default_value = "imbalance.csv")]
    output: String,

    /// Subset to apply correction to (train, test or all).
    #[arg(
        short = 's',
        long,
        default_value = "train",
        ignore_case = true,
        value_parser = PossibleValuesParser::new(Subset::ALL.map(Subset::name))
    )]
    subset: String,

    /// Random seed shared by every run.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// ROC chart file name.
    #[arg(long, default_value = "roc.svg")]
    roc: String,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    if !cli.directory.is_dir() {
        eprintln!("{}", Error::InvalidDirectory(cli.directory.display().to_string()));
        std::process::exit(-1);
    }

    let ratio = match RatioSpec::parse(&cli.ratio, cli.steps) {
        Ok(ratio) => ratio,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(-1);
        }
    };
    info!(%ratio, "Parsed ratio");

    if let Err(e) = run(&cli, ratio) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, ratio: RatioSpec) -> anyhow::Result<()> {
    let options = Options::load(&cli.ini)
        .with_context(|| format!("loading options from {}", cli.ini.display()))?;
    info!(selections = ?options.selections, "Selected features");

    let sweeper = ParameterSweeper::new(SweepPlan::from_choices(
        &cli.classifier,
        &cli.algorithm,
        ratio,
    )?);
    let subset: Subset = cli.subset.parse()?;
    let data = Dataset::load(&cli.data, &options.label)
        .with_context(|| format!("loading dataset {}", cli.data.display()))?;
    info!(rows = data.len(), counts = ?data.class_counts(), "Loaded dataset");

    let mut manifest = RunManifest::builder("imbalance")
        .config(serde_json::json!({
            "algorithm": cli.algorithm,
            "classifier": cli.classifier,
            "data": cli.data,
            "ratio": sweeper.plan().ratio,
            "subset": subset.name(),
            "seed": cli.seed,
            "selections": options.selections,
        }))
        .build();
    manifest.start();
    let manifest_path = cli.directory.join(MANIFEST_FILE);

    let mut runner = DatasetRunner::new(data, options.selections.clone())
        .with_label_column(options.label.clone())
        .with_subset(subset)
        .with_output_directory(&cli.directory)
        .with_seed(cli.seed);
    let mut store = ResultStore::new();

    let result = sweeper
        .run(&mut runner, &mut store)
        .context("sweep failed")
        .and_then(|summary| {
            manifest.record_runs(summary.baseline_runs, summary.corrected_runs);
            write_outputs(cli, &store, &mut manifest)
        });

    let status = if result.is_ok() {
        SweepStatus::Success
    } else {
        SweepStatus::Failed
    };
    manifest.complete(status);
    if let Err(e) = manifest.write(&manifest_path) {
        warn!(error = %e, path = %manifest_path.display(), "Unable to write manifest");
    }
    result
}

fn write_outputs(cli: &Cli, store: &ResultStore, manifest: &mut RunManifest) -> anyhow::Result<()> {
    let corrected = cli.directory.join(&cli.output);
    let uncorrected = cli.directory.join(format!("uncorrected-{}", cli.output));
    store
        .export_tables(&corrected, &uncorrected)
        .context("writing result tables")?;
    manifest.add_output(corrected);
    manifest.add_output(uncorrected);

    let roc = cli.directory.join(&cli.roc);
    render_roc(store, &roc, manifest);
    Ok(())
}

/// A chart that fails to render does not fail the sweep.
fn render_roc(store: &ResultStore, path: &Path, manifest: &mut RunManifest) {
    match store.render_roc_plot(path) {
        Ok(()) => manifest.add_output(path),
        Err(e) => warn!(error = %e, path = %path.display(), "Unable to render ROC curves"),
    }
}
