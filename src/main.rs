use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use psephos_features::RawRecord;
use psephos_forest::ForestConfig;
use psephos_mlp::MlpConfig;
use psephos_model::{
    BackendKind, ModelMetrics, PredictionResult, RankedFeature, TrainedModel, TrainingConfig,
    TrainingRequest, TrainingSummary,
};

#[derive(Parser)]
#[command(name = "psephos")]
#[command(about = "Regional election outcome prediction")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Model selection and hyperparameters shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Backend: "random-forest" or "tensorflow" (overrides the file's modelType)
    #[arg(long)]
    model_type: Option<String>,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Minimum samples per leaf
    #[arg(long, default_value_t = 2)]
    min_samples_leaf: usize,

    /// Training epochs for the neural backend
    #[arg(long, default_value_t = 100)]
    epochs: usize,

    /// Year selected from yearly economic/security series
    #[arg(long, default_value_t = psephos_features::DEFAULT_REFERENCE_YEAR)]
    reference_year: i32,

    /// Number of top-ranked features to print
    #[arg(long, default_value_t = 10)]
    top_features: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Train on a labelled file and print metrics
    Train {
        /// Path to the training JSON file ({inputs, outputs, modelType})
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Train on a labelled file, then predict one or more regions
    Predict {
        /// Path to the training JSON file ({inputs, outputs, modelType})
        #[arg(long)]
        data: PathBuf,

        /// Path to a JSON record or array of records to predict
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    summary: TrainingSummary,
    metrics: ModelMetrics,
    top_features: Vec<RankedFeature>,
}

#[derive(Serialize)]
struct PredictOutput {
    summary: TrainingSummary,
    predictions: Vec<RegionPrediction>,
}

#[derive(Serialize)]
struct RegionPrediction {
    region: String,
    #[serde(flatten)]
    prediction: PredictionResult,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawRecord>),
    One(Box<RawRecord>),
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn build_config(args: &ModelArgs, seed: u64) -> Result<TrainingConfig> {
    let forest = ForestConfig::new(args.n_trees)
        .context("invalid random forest configuration")?
        .with_max_depth(Some(args.max_depth))
        .with_min_samples_leaf(args.min_samples_leaf)
        .with_seed(seed);
    let mlp = MlpConfig::new().with_epochs(args.epochs).with_seed(seed);

    let mut config = TrainingConfig::new()
        .with_forest(forest)
        .with_mlp(mlp)
        .with_reference_year(args.reference_year)
        .with_importance_seed(seed);
    if let Some(name) = &args.model_type {
        let kind: BackendKind = name.parse().context("invalid --model-type")?;
        config = config.with_backend(kind);
    }
    Ok(config)
}

fn train(data: &Path, args: &ModelArgs, seed: u64) -> Result<(TrainedModel, ModelMetrics, TrainingSummary)> {
    let request: TrainingRequest = read_json(data)?;
    info!(
        path = %data.display(),
        n_inputs = request.inputs.len(),
        n_outputs = request.outputs.len(),
        "loaded training data"
    );
    let config = build_config(args, seed)?;
    TrainedModel::train(&request, &config).context("training failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train { data, model } => {
            let (_, metrics, summary) = train(&data, &model, cli.seed)?;
            let mut top_features = metrics.ranked_features();
            top_features.truncate(model.top_features);
            let output = TrainOutput {
                summary,
                metrics,
                top_features,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict { data, input, model } => {
            let (trained, _, summary) = train(&data, &model, cli.seed)?;
            let records = match read_json::<OneOrMany>(&input)? {
                OneOrMany::Many(records) => records,
                OneOrMany::One(record) => vec![*record],
            };

            let predictions = records
                .iter()
                .map(|record| {
                    let prediction = trained
                        .predict_raw(record)
                        .with_context(|| format!("prediction failed for {}", record.region))?;
                    info!(
                        region = %record.region,
                        winner = %prediction.predicted_winner,
                        confidence = prediction.confidence,
                        "predicted"
                    );
                    Ok(RegionPrediction {
                        region: record.region.clone(),
                        prediction,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let output = PredictOutput {
                summary,
                predictions,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
