//! Dataset module for hand-landmark captures
//!
//! This module provides functionality for:
//! - Loading and saving the landmark dataset JSON
//! - Flattening 21 landmarks into the 63-float feature vector
//! - Label encoding shared with the inference side
//! - Stratified train/test splitting
//! - Class balancing through noisy duplication
//!
//! ## Dataset Layout
//!
//! The dataset is a single JSON array; each element carries a `label` string
//! and a `landmarks` list of 21 `{x, y, z}` points in capture order.

pub mod augmentation;
pub mod burn_dataset;
pub mod labels;
pub mod loader;
pub mod split;

// Re-export main types for convenience
pub use augmentation::{augment, AugmentConfig, AugmentReport, ClassAugmentation};
pub use burn_dataset::{LandmarkBatch, LandmarkBatcher, LandmarkDataset, LandmarkItem};
pub use labels::LabelEncoder;
pub use loader::{
    class_distribution, flatten_landmarks, flatten_samples, load_samples, save_samples,
    unflatten_features, ClassDistribution, Landmark, LandmarkSample,
};
pub use split::{holdout_tail, stratified_split, SplitIndices};

/// Default dataset location
pub const DEFAULT_DATASET_PATH: &str = "data/dataset.json";
