//! Sign Language Landmark Classifier CLI
//!
//! Entry point for training, augmenting, inspecting, exporting and running
//! the hand-landmark sign classifier.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use signlang::backend::{backend_name, default_device, DefaultBackend, TrainingBackend};
use signlang::dataset::{
    augment, class_distribution, flatten_samples, load_samples, save_samples, AugmentConfig,
    DEFAULT_DATASET_PATH,
};
use signlang::export::export_web_model;
use signlang::heuristic::evaluate_baseline;
use signlang::inference::{Predictor, DEFAULT_TOP_K};
use signlang::model::load_model;
use signlang::training::{run_training, TrainingConfig};
use signlang::utils::logging::{init_logging, LogConfig};
use signlang::utils::{format_progress_bar, Metrics};
use signlang::{LABELS_FILE, WEB_MODEL_DIR};

/// Sign-language letter recognition from hand landmarks
#[derive(Parser, Debug)]
#[command(name = "signlang")]
#[command(version)]
#[command(about = "Train, export and run a hand-landmark sign classifier with Burn", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the classifier and write all artifacts
    Train {
        /// Path to the landmark dataset JSON
        #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
        dataset: PathBuf,

        /// Output directory for model, labels, metrics and web export
        #[arg(short, long, default_value = "artifacts")]
        output_dir: PathBuf,

        /// Training config JSON; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of training epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Batch size for training
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Learning rate
        #[arg(short, long)]
        learning_rate: Option<f64>,

        /// Share of each class held out for testing
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Share of the training set used for validation
        #[arg(long)]
        validation_fraction: Option<f64>,

        /// Hidden layer widths, comma separated
        #[arg(long, value_delimiter = ',')]
        hidden_units: Option<Vec<usize>>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the TensorFlow.js export
        #[arg(long, default_value = "false")]
        skip_web_export: bool,
    },

    /// Balance class counts by duplicating samples with noise
    Augment {
        /// Input dataset JSON
        #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
        input: PathBuf,

        /// Output path (defaults to `<input>_augmented.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Classes to top up, comma separated (default: all)
        #[arg(long, value_delimiter = ',')]
        classes: Vec<String>,

        /// Target sample count per class (default: largest class)
        #[arg(short, long)]
        target: Option<usize>,

        /// Half-width of the uniform per-coordinate noise
        #[arg(short, long, default_value = "0.01")]
        noise: f64,

        /// Random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the class distribution of a dataset
    Stats {
        /// Path to the landmark dataset JSON
        #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
        dataset: PathBuf,
    },

    /// Run a trained model on one vector or a whole dataset
    Infer {
        /// Directory written by `train`
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// 63 comma-separated values
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, conflicts_with = "dataset")]
        features: Option<Vec<f32>>,

        /// Evaluate every sample of a dataset JSON
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Number of ranked classes to print
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Export a trained model in the TensorFlow.js layers format
    Export {
        /// Directory written by `train`
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Output directory (defaults to `<artifacts>/web_model`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Score the rule-based classifier on a dataset
    Baseline {
        /// Path to the landmark dataset JSON
        #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
        dataset: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };

    let _ = init_logging(&log_config);

    match cli.command {
        Commands::Train {
            dataset,
            output_dir,
            config,
            epochs,
            batch_size,
            learning_rate,
            test_fraction,
            validation_fraction,
            hidden_units,
            seed,
            skip_web_export,
        } => {
            let mut training = match config {
                Some(path) => TrainingConfig::load(&path)
                    .with_context(|| format!("Failed to read training config {:?}", path))?,
                None => TrainingConfig::default(),
            };
            if let Some(v) = epochs {
                training.epochs = v;
            }
            if let Some(v) = batch_size {
                training.batch_size = v;
            }
            if let Some(v) = learning_rate {
                training.learning_rate = v;
            }
            if let Some(v) = test_fraction {
                training.test_fraction = v;
            }
            if let Some(v) = validation_fraction {
                training.validation_fraction = v;
            }
            if let Some(v) = hidden_units {
                training.hidden_units = v;
            }
            if let Some(v) = seed {
                training.seed = v;
            }
            training.skip_web_export |= skip_web_export;

            cmd_train(&dataset, &output_dir, &training)?;
        }

        Commands::Augment {
            input,
            output,
            classes,
            target,
            noise,
            seed,
        } => {
            let output = output.unwrap_or_else(|| augmented_path(&input));
            let config = AugmentConfig {
                classes,
                target_count: target,
                noise_level: noise,
                seed,
            };
            cmd_augment(&input, &output, &config)?;
        }

        Commands::Stats { dataset } => cmd_stats(&dataset)?,

        Commands::Infer {
            artifacts,
            features,
            dataset,
            top_k,
        } => match (features, dataset) {
            (Some(features), _) => cmd_infer_vector(&artifacts, &features, top_k)?,
            (None, Some(dataset)) => cmd_infer_dataset(&artifacts, &dataset)?,
            (None, None) => bail!("pass either --features or --dataset"),
        },

        Commands::Export { artifacts, output } => {
            let output = output.unwrap_or_else(|| artifacts.join(WEB_MODEL_DIR));
            cmd_export(&artifacts, &output)?;
        }

        Commands::Baseline { dataset } => cmd_baseline(&dataset)?,
    }

    Ok(())
}

/// `data/set.json` -> `data/set_augmented.json`
fn augmented_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    input.with_file_name(format!("{}_augmented.json", stem))
}

fn cmd_train(dataset: &Path, output_dir: &Path, config: &TrainingConfig) -> Result<()> {
    println!("{}", "Initializing Training...".green().bold());
    println!("  Backend:       {}", backend_name());
    println!("  Epochs:        {}", config.epochs);
    println!("  Batch size:    {}", config.batch_size);
    println!("  Learning rate: {}", config.learning_rate);
    println!("  Hidden units:  {:?}", config.hidden_units);
    println!();

    let summary = run_training::<TrainingBackend>(dataset, output_dir, config)?;

    println!();
    println!("{}", "Training Complete!".green().bold());
    println!("{}", summary.test_metrics.display());
    println!("{}", "Next steps:".cyan().bold());
    println!("  • Serve: signlang-server --artifacts {:?}", output_dir);
    println!("  • Infer: signlang infer --artifacts {:?} --dataset {:?}", output_dir, dataset);
    Ok(())
}

fn cmd_augment(input: &Path, output: &Path, config: &AugmentConfig) -> Result<()> {
    let samples = load_samples(input)?;
    let (augmented, report) = augment(&samples, config)?;

    for entry in &report.classes {
        if entry.added > 0 {
            println!("Augmented {}: added {} samples.", entry.class, entry.added);
        } else {
            println!("No augmentation needed for {}.", entry.class);
        }
    }

    save_samples(output, &augmented)?;
    println!(
        "{} {} samples ({} added). Saved as {:?}.",
        "Augmentation complete.".green().bold(),
        augmented.len(),
        report.total_added(),
        output
    );
    Ok(())
}

fn cmd_stats(dataset: &Path) -> Result<()> {
    let samples = load_samples(dataset)?;
    let distribution = class_distribution(&samples);
    let largest = distribution.largest().map(|(_, c)| c).unwrap_or(0).max(1);

    println!("{}", "Class distribution:".cyan().bold());
    for (label, count) in &distribution.counts {
        let bar = format_progress_bar(*count as f64 / largest as f64, 30);
        println!("  {:<20} {:>5}  {}", label, count, bar);
    }
    println!();
    println!(
        "  {} samples across {} classes",
        distribution.total(),
        distribution.num_classes()
    );
    Ok(())
}

fn cmd_infer_vector(artifacts: &Path, features: &[f32], top_k: usize) -> Result<()> {
    let predictor = Predictor::<DefaultBackend>::load(artifacts, &default_device())?;
    let prediction = predictor.predict(features)?;

    println!(
        "Prediction: {} (class {})",
        prediction.label.green().bold(),
        prediction.class_index
    );
    println!("Confidence: {:.2}%", prediction.confidence * 100.0);
    println!("Inference time: {:.2} ms", prediction.inference_time_ms);
    println!();
    println!("Top-{} predictions:", top_k);
    for (rank, (idx, prob)) in prediction.top_k(top_k).into_iter().enumerate() {
        let label = predictor.labels().decode(idx)?;
        println!("  {}. {} - {:.2}%", rank + 1, label, prob * 100.0);
    }
    Ok(())
}

fn cmd_infer_dataset(artifacts: &Path, dataset: &Path) -> Result<()> {
    let predictor = Predictor::<DefaultBackend>::load(artifacts, &default_device())?;
    let samples = load_samples(dataset)?;
    let (rows, labels) = flatten_samples(&samples)?;

    let truth = predictor.labels().encode_all(&labels)?;
    let predictions: Vec<usize> = predictor
        .predict_batch(&rows)?
        .into_iter()
        .map(|p| p.class_index)
        .collect();

    let metrics = Metrics::from_predictions(&predictions, &truth, predictor.num_classes())
        .with_class_names(predictor.labels().classes());
    println!("{}", metrics.display());
    Ok(())
}

fn cmd_export(artifacts: &Path, output: &Path) -> Result<()> {
    let (model, _) = load_model::<DefaultBackend>(artifacts, &default_device())?;
    let export = export_web_model(&model, output)?;

    let labels = artifacts.join(LABELS_FILE);
    std::fs::copy(&labels, output.join(LABELS_FILE))
        .with_context(|| format!("Failed to copy {:?}", labels))?;

    info!("Export complete: {:?}", export.model_json);
    println!("{}", "Export Complete!".green().bold());
    println!("  Layers:  {:?}", export.layer_dims);
    println!("  Weights: {} floats", export.num_weights);
    println!("  Written: {:?}", output);
    Ok(())
}

fn cmd_baseline(dataset: &Path) -> Result<()> {
    let samples = load_samples(dataset)?;
    let report = evaluate_baseline(&samples);

    println!("{}", "Rule-based baseline:".cyan().bold());
    println!("  Samples: {}", report.total);
    println!("  Matched: {}", report.matched);
    println!("  Correct: {}", report.correct);
    println!("  Accuracy: {:.2}%", report.accuracy() * 100.0);
    Ok(())
}
