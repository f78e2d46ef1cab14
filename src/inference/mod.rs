//! Inference module for model prediction
//!
//! This module provides:
//! - Loading a trained model with its label list
//! - Single-vector and batched prediction
//! - Softmax probabilities and top-k ranking

pub mod predictor;

// Re-export main types for convenience
pub use predictor::{Prediction, Predictor};

/// Default number of ranked classes shown by the CLI
pub const DEFAULT_TOP_K: usize = 3;
