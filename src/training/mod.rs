//! Training module for the landmark classifier
//!
//! This module provides:
//! - Training hyperparameters (`TrainingConfig`), loadable from JSON
//! - The end-to-end training pipeline: load, encode, split, train,
//!   evaluate, and write every artifact the server and web client need
//!
//! ## Artifacts
//!
//! A training run writes into its output directory:
//! 1. `model.mpk` and `model_config.json`: weights and architecture
//! 2. `label_classes.json`: class list in index order
//! 3. `training_metrics.json`: per-epoch history and test-set metrics
//! 4. `web_model/`: TensorFlow.js layers export

pub mod trainer;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{read_json, Result, SignLangError};

pub use trainer::{evaluate, run_training, train_model, EpochMetrics, EvalResult, TrainingSummary};

/// Default number of training epochs
pub const DEFAULT_EPOCHS: usize = 30;

/// Default batch size
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Default learning rate
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;

/// Default share of each class held out for testing
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default share of the training set used for validation
pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.1;

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training epochs
    pub epochs: usize,

    /// Mini-batch size
    pub batch_size: usize,

    /// Adam learning rate
    pub learning_rate: f64,

    /// Share of each class held out for the test set, in (0, 1)
    pub test_fraction: f64,

    /// Share of the training set (taken from its tail) used for validation
    pub validation_fraction: f64,

    /// Seed for the split and for epoch shuffling
    pub seed: u64,

    /// Hidden layer widths
    pub hidden_units: Vec<usize>,

    /// Skip the TensorFlow.js export step
    pub skip_web_export: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            learning_rate: DEFAULT_LEARNING_RATE,
            test_fraction: DEFAULT_TEST_FRACTION,
            validation_fraction: DEFAULT_VALIDATION_FRACTION,
            seed: 42,
            hidden_units: vec![64, 32],
            skip_web_export: false,
        }
    }
}

impl TrainingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(SignLangError::Config("epochs must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(SignLangError::Config("batch_size must be > 0".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(SignLangError::Config(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SignLangError::Config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(SignLangError::Config(format!(
                "validation_fraction must be in [0, 1), got {}",
                self.validation_fraction
            )));
        }
        if self.hidden_units.iter().any(|&u| u == 0) {
            return Err(SignLangError::Config("hidden layer width must be > 0".to_string()));
        }
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from a JSON file; missing keys take defaults
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}
