//! # signlang
//!
//! Sign-language letter recognition from MediaPipe hand landmarks, built on
//! the Burn framework.
//!
//! ## Features
//!
//! - **Landmark dataset** handling: load, flatten, label-encode, split
//! - **Class balancing** by noise-perturbed duplication of captures
//! - **Dense classifier** trained with Adam on cross-entropy
//! - **Web export** in the TensorFlow.js layers format
//! - **Inference** shared with the HTTP server crate
//!
//! ## Modules
//!
//! - `dataset`: Loading, flattening, label encoding, splitting, augmentation
//! - `model`: The dense classifier and its persistence
//! - `training`: The end-to-end training pipeline
//! - `inference`: Prediction from a trained model
//! - `export`: TensorFlow.js layers-model writer
//! - `heuristic`: Rule-based reference classifier
//! - `utils`: Logging, metrics, and error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use signlang::backend::{default_device, DefaultBackend, TrainingBackend};
//! use signlang::inference::Predictor;
//! use signlang::training::{run_training, TrainingConfig};
//!
//! let summary = run_training::<TrainingBackend>(
//!     "data/dataset.json".as_ref(),
//!     "artifacts".as_ref(),
//!     &TrainingConfig::default(),
//! )?;
//!
//! let predictor = Predictor::<DefaultBackend>::load("artifacts".as_ref(), &default_device())?;
//! let prediction = predictor.predict(&features)?;
//! ```

pub mod backend;
pub mod dataset;
pub mod export;
pub mod heuristic;
pub mod inference;
pub mod model;
pub mod training;
pub mod utils;

// Re-export commonly used items for convenience
pub use dataset::{LabelEncoder, Landmark, LandmarkSample};
pub use inference::{Prediction, Predictor};
pub use model::{LandmarkClassifier, LandmarkClassifierConfig};
pub use training::{TrainingConfig, TrainingSummary};
pub use utils::error::{Result, SignLangError};
pub use utils::metrics::{ConfusionMatrix, Metrics};

/// Landmarks per hand in a MediaPipe capture
pub const NUM_LANDMARKS: usize = 21;

/// Length of the flattened feature vector (x, y, z per landmark)
pub const FEATURE_DIM: usize = NUM_LANDMARKS * 3;

/// Label list written next to the model
pub const LABELS_FILE: &str = "label_classes.json";

/// Training history and test metrics
pub const METRICS_FILE: &str = "training_metrics.json";

/// Subdirectory holding the TensorFlow.js export
pub const WEB_MODEL_DIR: &str = "web_model";

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
