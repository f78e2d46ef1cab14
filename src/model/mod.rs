//! Model module for the landmark classifier using the Burn framework
//!
//! This module provides:
//! - The dense classifier over 63-float landmark vectors
//! - Its Burn `Config`, persisted as `model_config.json`
//! - Weight persistence helpers for the trained record

pub mod classifier;

use std::path::Path;

use burn::module::Module;
use burn::record::CompactRecorder;
use burn::tensor::backend::Backend;

pub use classifier::{LandmarkClassifier, LandmarkClassifierConfig};

use crate::utils::error::{Result, SignLangError};

/// File stem of the saved weights; the recorder appends `.mpk`
pub const MODEL_FILE_STEM: &str = "model";

/// File name of the saved architecture config
pub const MODEL_CONFIG_FILE: &str = "model_config.json";

/// Save model weights to `<dir>/model.mpk` and its config next to it
pub fn save_model<B: Backend>(
    model: &LandmarkClassifier<B>,
    config: &LandmarkClassifierConfig,
    dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    config.save_json(dir.join(MODEL_CONFIG_FILE))?;

    let recorder = CompactRecorder::new();
    model
        .clone()
        .save_file(dir.join(MODEL_FILE_STEM), &recorder)
        .map_err(|e| SignLangError::Model(format!("Failed to save model: {:?}", e)))?;
    Ok(())
}

/// Load a model saved by [`save_model`]
pub fn load_model<B: Backend>(
    dir: &Path,
    device: &B::Device,
) -> Result<(LandmarkClassifier<B>, LandmarkClassifierConfig)> {
    load_model_from(
        &dir.join(format!("{}.mpk", MODEL_FILE_STEM)),
        &dir.join(MODEL_CONFIG_FILE),
        device,
    )
}

/// Load weights from an explicit record file and config file
///
/// The recorder replaces the extension of `weights` with `.mpk`.
pub fn load_model_from<B: Backend>(
    weights: &Path,
    config_path: &Path,
    device: &B::Device,
) -> Result<(LandmarkClassifier<B>, LandmarkClassifierConfig)> {
    let config = LandmarkClassifierConfig::load_json(config_path)?;
    config.validate()?;

    crate::utils::error::ensure_exists(&weights.with_extension("mpk"))?;

    let recorder = CompactRecorder::new();
    let model = config
        .init::<B>(device)
        .load_file(weights.to_path_buf(), &recorder, device)
        .map_err(|e| SignLangError::Model(format!("Failed to load model weights: {:?}", e)))?;

    Ok((model, config))
}
