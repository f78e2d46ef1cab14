//! Supervised Training Implementation
//!
//! A hand-written loop over Burn's autodiff backend: Adam on cross-entropy
//! over logits, reshuffled mini-batches every epoch, and an evaluation pass
//! on the validation tail after each epoch.

use std::path::{Path, PathBuf};

use burn::{
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{
        backend::{AutodiffBackend, Backend},
        ElementConversion,
    },
};
use chrono::Local;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::TrainingConfig;
use crate::dataset::{
    flatten_samples, holdout_tail, load_samples, stratified_split, LabelEncoder, LandmarkBatcher,
    LandmarkDataset,
};
use crate::export::export_web_model;
use crate::model::{save_model, LandmarkClassifier, LandmarkClassifierConfig};
use crate::utils::error::{Result, SignLangError};
use crate::utils::{Metrics, TrainingLogger};
use crate::{LABELS_FILE, METRICS_FILE, WEB_MODEL_DIR};

/// Loss and accuracy for one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
}

/// Result of evaluating a model on a dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalResult {
    /// Mean cross-entropy per sample
    pub loss: f64,
    /// Fraction of correct predictions in [0, 1]
    pub accuracy: f64,
    /// Predicted class index per sample, in dataset order
    pub predictions: Vec<usize>,
}

/// Everything a training run produced, also written as `training_metrics.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub created_at: String,
    pub output_dir: PathBuf,
    pub config: TrainingConfig,
    pub classes: Vec<String>,
    pub train_samples: usize,
    pub validation_samples: usize,
    pub test_samples: usize,
    pub test_loss: f64,
    pub test_accuracy: f64,
    pub history: Vec<EpochMetrics>,
    pub test_metrics: Metrics,
}

impl TrainingSummary {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Run the full training pipeline
///
/// # Type Parameters
/// * `B` - The autodiff backend to use (e.g., `Autodiff<NdArray>`)
///
/// # Arguments
/// * `dataset_path` - JSON dataset of labeled landmark captures
/// * `output_dir` - Directory that receives every artifact
/// * `config` - Training hyperparameters
pub fn run_training<B: AutodiffBackend>(
    dataset_path: &Path,
    output_dir: &Path,
    config: &TrainingConfig,
) -> Result<TrainingSummary> {
    config.validate()?;

    println!("{}", "Loading Dataset...".cyan());
    let samples = load_samples(dataset_path)?;
    if samples.is_empty() {
        return Err(SignLangError::Dataset(format!("{:?} contains no samples", dataset_path)));
    }

    let (features, labels) = flatten_samples(&samples)?;
    let encoder = LabelEncoder::fit(&labels)?;
    if encoder.len() < 2 {
        return Err(SignLangError::Dataset(format!(
            "need at least 2 classes to train, found {}",
            encoder.len()
        )));
    }
    let encoded = encoder.encode_all(&labels)?;
    info!("Classes ({}): {:?}", encoder.len(), encoder.classes());

    let split = stratified_split(&encoded, config.test_fraction, config.seed)?;
    let (train_idx, val_idx) = holdout_tail(&split.train, config.validation_fraction)?;

    let all = LandmarkDataset::new(features, encoded)?;
    let train_set = LandmarkDataset::select(all.items(), &train_idx);
    let val_set = LandmarkDataset::select(all.items(), &val_idx);
    let test_set = LandmarkDataset::select(all.items(), &split.test);

    if train_set.is_empty() {
        return Err(SignLangError::Training("training set is empty after the split".to_string()));
    }

    println!("{}", "Dataset Splits:".cyan().bold());
    println!("  Training samples:   {}", train_set.len());
    println!("  Validation samples: {}", val_set.len());
    println!("  Test samples:       {}", test_set.len());

    let model_config = LandmarkClassifierConfig::new(encoder.len())
        .with_hidden_units(config.hidden_units.clone());
    model_config.validate()?;

    let device = B::Device::default();
    let (model, history) = train_model::<B>(&train_set, &val_set, &model_config, config, &device)?;

    let model = model.valid();
    let inner_device = <B::InnerBackend as Backend>::Device::default();
    let test = evaluate(&model, &test_set, config.batch_size, &inner_device)?;

    println!("Test accuracy: {:.2}", test.accuracy);

    let test_metrics = Metrics::from_predictions(&test.predictions, &test_set.labels(), encoder.len())
        .with_class_names(encoder.classes())
        .with_loss(test.loss);
    debug!("Test set metrics:\n{}", test_metrics.display());

    println!("{}", "Saving Artifacts...".cyan());
    std::fs::create_dir_all(output_dir)?;
    save_model(&model, &model_config, output_dir)?;
    encoder.save(output_dir.join(LABELS_FILE))?;

    if !config.skip_web_export {
        let web_dir = output_dir.join(WEB_MODEL_DIR);
        let export = export_web_model(&model, &web_dir)?;
        encoder.save(web_dir.join(LABELS_FILE))?;
        info!("Web model written to {:?} ({} weights)", web_dir, export.num_weights);
    }

    let summary = TrainingSummary {
        created_at: Local::now().to_rfc3339(),
        output_dir: output_dir.to_path_buf(),
        config: config.clone(),
        classes: encoder.classes().to_vec(),
        train_samples: train_set.len(),
        validation_samples: val_set.len(),
        test_samples: test_set.len(),
        test_loss: test.loss,
        test_accuracy: test.accuracy,
        history,
        test_metrics,
    };
    summary.save(&output_dir.join(METRICS_FILE))?;

    println!("  Saved to: {:?}", output_dir);
    Ok(summary)
}

/// Train a fresh model on `train`, validating on `validation` after each epoch
///
/// An empty `validation` set skips the per-epoch validation pass.
pub fn train_model<B: AutodiffBackend>(
    train: &LandmarkDataset,
    validation: &LandmarkDataset,
    model_config: &LandmarkClassifierConfig,
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<(LandmarkClassifier<B>, Vec<EpochMetrics>)> {
    config.validate()?;
    if train.is_empty() {
        return Err(SignLangError::Training("cannot train on an empty dataset".to_string()));
    }

    let mut model = model_config.init::<B>(device);
    let mut optimizer = AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-7)
        .init();
    let loss_fn = CrossEntropyLossConfig::new().init(device);
    let batcher = LandmarkBatcher::new();

    let inner_device = <B::InnerBackend as Backend>::Device::default();
    let mut epoch_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut logger = TrainingLogger::new(config.epochs);
    let mut history = Vec::with_capacity(config.epochs);

    let num_batches = train.len().div_ceil(config.batch_size);

    for epoch in 0..config.epochs {
        logger.start_epoch(epoch);

        let mut indices: Vec<usize> = (0..train.len()).collect();
        indices.shuffle(&mut epoch_rng);

        let progress = epoch_progress(num_batches as u64, epoch + 1, config.epochs);
        let mut loss_sum = 0.0f64;
        let mut correct = 0usize;
        let mut seen = 0usize;

        for window in indices.chunks(config.batch_size) {
            let items: Vec<_> = window.iter().filter_map(|&i| train.get(i)).collect();
            let batch_len = items.len();
            let batch = batcher.batch(items, device);

            let output = model.forward(batch.features);
            let loss = loss_fn.forward(output.clone(), batch.targets.clone());

            let loss_value: f64 = loss.clone().into_scalar().elem();
            loss_sum += loss_value * batch_len as f64;

            let batch_correct: i64 = output
                .argmax(1)
                .reshape([batch_len])
                .equal(batch.targets)
                .int()
                .sum()
                .into_scalar()
                .elem();
            correct += batch_correct as usize;
            seen += batch_len;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);

            progress.set_message(format!("loss {:.4}", loss_value));
            progress.inc(1);
        }
        progress.finish_and_clear();

        let train_loss = loss_sum / seen.max(1) as f64;
        let train_accuracy = correct as f64 / seen.max(1) as f64;

        let val = if validation.is_empty() {
            None
        } else {
            let result = evaluate(&model.valid(), validation, config.batch_size, &inner_device)?;
            Some((result.loss, result.accuracy))
        };

        logger.end_epoch(train_loss, train_accuracy, val);
        history.push(EpochMetrics {
            epoch: epoch + 1,
            train_loss,
            train_accuracy,
            val_loss: val.map(|(l, _)| l),
            val_accuracy: val.map(|(_, a)| a),
        });
    }

    Ok((model, history))
}

/// Evaluate a model on a dataset in order, without gradient tracking
pub fn evaluate<B: Backend>(
    model: &LandmarkClassifier<B>,
    dataset: &LandmarkDataset,
    batch_size: usize,
    device: &B::Device,
) -> Result<EvalResult> {
    if dataset.is_empty() {
        return Err(SignLangError::Training("cannot evaluate on an empty dataset".to_string()));
    }
    if batch_size == 0 {
        return Err(SignLangError::Config("batch_size must be > 0".to_string()));
    }

    let batcher = LandmarkBatcher::new();
    let loss_fn = CrossEntropyLossConfig::new().init(device);

    let mut loss_sum = 0.0f64;
    let mut predictions = Vec::with_capacity(dataset.len());

    for chunk in dataset.items().chunks(batch_size) {
        let batch = batcher.batch(chunk.to_vec(), device);
        let output = model.forward(batch.features);

        let loss: f64 = loss_fn
            .forward(output.clone(), batch.targets)
            .into_scalar()
            .elem();
        loss_sum += loss * chunk.len() as f64;

        let predicted = output.argmax(1).into_data();
        predictions.extend(predicted.iter::<i64>().map(|p| p as usize));
    }

    let correct = predictions
        .iter()
        .zip(dataset.items())
        .filter(|(p, item)| **p == item.label)
        .count();

    Ok(EvalResult {
        loss: loss_sum / dataset.len() as f64,
        accuracy: correct as f64 / dataset.len() as f64,
        predictions,
    })
}

fn epoch_progress(len: u64, epoch: usize, epochs: usize) -> ProgressBar {
    let progress = ProgressBar::new(len);
    let style = ProgressStyle::with_template("  {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.set_prefix(format!("Epoch {}/{}", epoch, epochs));
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{save_samples, Landmark, LandmarkSample};
    use crate::NUM_LANDMARKS;
    use burn::backend::Autodiff;
    use burn_ndarray::NdArray;

    type TestBackend = Autodiff<NdArray<f32>>;

    /// Well separated classes: every coordinate of class `c` sits near `0.2 + 0.3c`
    fn separable_samples(classes: &[&str], per_class: usize) -> Vec<LandmarkSample> {
        let mut samples = Vec::new();
        for (c, label) in classes.iter().enumerate() {
            for i in 0..per_class {
                let center = 0.2 + 0.3 * c as f64;
                let landmarks = (0..NUM_LANDMARKS)
                    .map(|j| {
                        let jitter = ((i * 7 + j * 3) % 11) as f64 / 500.0;
                        Landmark::new(center + jitter, center - jitter, jitter)
                    })
                    .collect();
                samples.push(LandmarkSample::new(*label, landmarks));
            }
        }
        samples
    }

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            epochs: 15,
            batch_size: 8,
            learning_rate: 0.01,
            hidden_units: vec![16, 8],
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_run_training_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("dataset.json");
        let output = dir.path().join("out");
        save_samples(&dataset, &separable_samples(&["V (Peace)", "A (Fist)", "L (L-shape)"], 12)).unwrap();

        let summary = run_training::<TestBackend>(&dataset, &output, &quick_config()).unwrap();

        assert_eq!(summary.classes, vec!["A (Fist)", "L (L-shape)", "V (Peace)"]);
        assert_eq!(summary.history.len(), 15);
        assert_eq!(summary.test_samples, 3 * 2);
        assert_eq!(summary.train_samples + summary.validation_samples, 3 * 10);
        assert!(summary.history.last().unwrap().train_loss < summary.history[0].train_loss);
        assert!((0.0..=1.0).contains(&summary.test_accuracy));

        for file in ["model.mpk", "model_config.json", LABELS_FILE, METRICS_FILE] {
            assert!(output.join(file).exists(), "missing {}", file);
        }
        assert!(output.join(WEB_MODEL_DIR).join("model.json").exists());
        assert!(output.join(WEB_MODEL_DIR).join(LABELS_FILE).exists());

        let labels = LabelEncoder::load(output.join(LABELS_FILE)).unwrap();
        assert_eq!(labels.classes(), summary.classes.as_slice());
    }

    #[test]
    fn test_run_training_rejects_single_class() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("dataset.json");
        save_samples(&dataset, &separable_samples(&["A (Fist)"], 5)).unwrap();

        let err = run_training::<TestBackend>(&dataset, dir.path(), &quick_config()).unwrap_err();
        assert!(err.to_string().contains("at least 2 classes"));
    }

    #[test]
    fn test_run_training_rejects_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("dataset.json");
        save_samples(&dataset, &[]).unwrap();

        assert!(run_training::<TestBackend>(&dataset, dir.path(), &quick_config()).is_err());
    }

    #[test]
    fn test_evaluate_reports_predictions_in_order() {
        let device = Default::default();
        let model = LandmarkClassifierConfig::new(2).init::<NdArray<f32>>(&device);
        let ds = LandmarkDataset::new(vec![vec![0.1; 63], vec![0.9; 63], vec![0.5; 63]], vec![0, 1, 0]).unwrap();

        let result = evaluate(&model, &ds, 2, &device).unwrap();
        assert_eq!(result.predictions.len(), 3);
        assert!(result.predictions.iter().all(|p| *p < 2));
        assert!(result.loss.is_finite());
        assert!(evaluate(&model, &LandmarkDataset::default(), 2, &device).is_err());
    }

    #[test]
    fn test_train_model_without_validation() {
        let device = Default::default();
        let samples = separable_samples(&["A", "B"], 6);
        let (features, labels) = flatten_samples(&samples).unwrap();
        let encoded = LabelEncoder::fit(&labels).unwrap().encode_all(&labels).unwrap();
        let train = LandmarkDataset::new(features, encoded).unwrap();

        let config = TrainingConfig { epochs: 2, ..quick_config() };
        let (_, history) = train_model::<TestBackend>(
            &train,
            &LandmarkDataset::default(),
            &LandmarkClassifierConfig::new(2),
            &config,
            &device,
        )
        .unwrap();

        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|h| h.val_loss.is_none()));
    }
}
