//! Inference Predictor Module
//!
//! Loads a trained classifier together with its label list and maps a
//! 63-float landmark vector to a class label. The flatten step and the label
//! list are the same ones used during training.

use std::path::Path;
use std::time::Instant;

use burn::tensor::{backend::Backend, Tensor, TensorData};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::{flatten_landmarks, LabelEncoder, Landmark};
use crate::model::{load_model, load_model_from, LandmarkClassifier};
use crate::utils::error::{Result, SignLangError};
use crate::{FEATURE_DIM, LABELS_FILE};

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class label
    pub label: String,

    /// Predicted class index
    pub class_index: usize,

    /// Probability of the predicted class
    pub confidence: f32,

    /// Full probability distribution over all classes
    pub probabilities: Vec<f32>,

    /// Inference time in milliseconds
    pub inference_time_ms: f64,
}

impl Prediction {
    /// Build from a probability row; ties resolve to the lowest index
    pub fn from_probabilities(probabilities: Vec<f32>, labels: &LabelEncoder) -> Result<Self> {
        let mut class_index = 0;
        for (i, &p) in probabilities.iter().enumerate() {
            if p > probabilities[class_index] {
                class_index = i;
            }
        }

        let confidence = probabilities
            .get(class_index)
            .copied()
            .ok_or_else(|| SignLangError::Inference("empty probability vector".to_string()))?;

        Ok(Self {
            label: labels.decode(class_index)?.to_string(),
            class_index,
            confidence,
            probabilities,
            inference_time_ms: 0.0,
        })
    }

    /// The `k` most probable classes as `(index, probability)`, best first
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut indexed: Vec<(usize, f32)> = self.probabilities.iter().copied().enumerate().collect();
        // Stable sort keeps lower indices first among equal probabilities
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(k);
        indexed
    }
}

/// Predictor for running inference with a trained model
pub struct Predictor<B: Backend> {
    model: LandmarkClassifier<B>,
    labels: LabelEncoder,
    device: B::Device,
}

impl<B: Backend> Predictor<B> {
    /// Load `model.mpk`, `model_config.json` and `label_classes.json` from a directory
    pub fn load(artifacts_dir: &Path, device: &B::Device) -> Result<Self> {
        let (model, _) = load_model::<B>(artifacts_dir, device)?;
        let labels = LabelEncoder::load(artifacts_dir.join(LABELS_FILE))?;
        info!("Loaded model from {:?} ({} classes)", artifacts_dir, labels.len());
        Self::from_parts(model, labels, device.clone())
    }

    /// Load from explicit weight, config and label paths
    pub fn load_from(
        model_path: &Path,
        config_path: &Path,
        labels_path: &Path,
        device: &B::Device,
    ) -> Result<Self> {
        let (model, _) = load_model_from::<B>(model_path, config_path, device)?;
        let labels = LabelEncoder::load(labels_path)?;
        info!("Loaded model from {:?} ({} classes)", model_path, labels.len());
        Self::from_parts(model, labels, device.clone())
    }

    /// Assemble from an in-memory model and label list
    pub fn from_parts(model: LandmarkClassifier<B>, labels: LabelEncoder, device: B::Device) -> Result<Self> {
        if labels.len() != model.num_classes() {
            return Err(SignLangError::Model(format!(
                "label list has {} classes but the model outputs {}",
                labels.len(),
                model.num_classes()
            )));
        }
        Ok(Self { model, labels, device })
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Classify one flattened landmark vector of exactly 63 finite values
    pub fn predict(&self, features: &[f32]) -> Result<Prediction> {
        validate_features(features)?;

        let start = Instant::now();
        let input = Tensor::<B, 2>::from_floats(TensorData::new(features.to_vec(), [1, FEATURE_DIM]), &self.device);
        let probabilities: Vec<f32> = self.model.forward_softmax(input).into_data().iter::<f32>().collect();

        let mut prediction = Prediction::from_probabilities(probabilities, &self.labels)?;
        prediction.inference_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        debug!(
            "Predicted {} ({:.3}) in {:.2} ms",
            prediction.label, prediction.confidence, prediction.inference_time_ms
        );
        Ok(prediction)
    }

    /// Classify 21 landmarks, flattened exactly as in training
    pub fn predict_landmarks(&self, landmarks: &[Landmark]) -> Result<Prediction> {
        let features = flatten_landmarks(landmarks).map_err(|e| SignLangError::InvalidInput(e.to_string()))?;
        self.predict(&features)
    }

    /// Classify many vectors in a single forward pass
    pub fn predict_batch(&self, rows: &[Vec<f32>]) -> Result<Vec<Prediction>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        for row in rows {
            validate_features(row)?;
        }

        let start = Instant::now();
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let input = Tensor::<B, 2>::from_floats(TensorData::new(flat, [rows.len(), FEATURE_DIM]), &self.device);
        let probabilities: Vec<f32> = self.model.forward_softmax(input).into_data().iter::<f32>().collect();
        let per_row_ms = start.elapsed().as_secs_f64() * 1000.0 / rows.len() as f64;

        probabilities
            .chunks(self.num_classes())
            .map(|row| {
                let mut prediction = Prediction::from_probabilities(row.to_vec(), &self.labels)?;
                prediction.inference_time_ms = per_row_ms;
                Ok(prediction)
            })
            .collect()
    }
}

fn validate_features(features: &[f32]) -> Result<()> {
    if features.len() != FEATURE_DIM {
        return Err(SignLangError::InvalidInput(format!(
            "expected {} values, got {}",
            FEATURE_DIM,
            features.len()
        )));
    }
    if let Some(idx) = features.iter().position(|v| !v.is_finite()) {
        return Err(SignLangError::InvalidInput(format!("value {} is not finite", idx)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::tests::synthetic_hand;
    use crate::model::{save_model, LandmarkClassifierConfig};
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn labels() -> LabelEncoder {
        LabelEncoder::fit(["A (Fist)", "B (Open Palm)", "C (C-shape)"]).unwrap()
    }

    fn predictor() -> Predictor<TestBackend> {
        let device = Default::default();
        let model = LandmarkClassifierConfig::new(3).init::<TestBackend>(&device);
        Predictor::from_parts(model, labels(), device).unwrap()
    }

    #[test]
    fn test_predict_returns_distribution() {
        let prediction = predictor().predict(&[0.25; FEATURE_DIM]).unwrap();

        assert_eq!(prediction.probabilities.len(), 3);
        let sum: f32 = prediction.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(labels().classes().contains(&prediction.label));
        assert_eq!(prediction.confidence, prediction.probabilities[prediction.class_index]);
    }

    #[test]
    fn test_predict_rejects_bad_input() {
        let p = predictor();
        assert!(matches!(p.predict(&[0.0; 62]), Err(SignLangError::InvalidInput(_))));
        assert!(matches!(p.predict(&[0.0; 64]), Err(SignLangError::InvalidInput(_))));

        let mut nan = [0.0f32; FEATURE_DIM];
        nan[10] = f32::NAN;
        assert!(matches!(p.predict(&nan), Err(SignLangError::InvalidInput(_))));
    }

    #[test]
    fn test_predict_landmarks_matches_flattened() {
        let p = predictor();
        let hand = synthetic_hand(3.0);
        let features = flatten_landmarks(&hand).unwrap();

        let a = p.predict_landmarks(&hand).unwrap();
        let b = p.predict(&features).unwrap();
        assert_eq!(a.class_index, b.class_index);
        assert_eq!(a.probabilities, b.probabilities);
        assert!(p.predict_landmarks(&hand[..20]).is_err());
    }

    #[test]
    fn test_predict_batch_matches_single() {
        let p = predictor();
        let rows = vec![vec![0.1; FEATURE_DIM], vec![0.7; FEATURE_DIM]];
        let batch = p.predict_batch(&rows).unwrap();

        assert_eq!(batch.len(), 2);
        for (row, pred) in rows.iter().zip(&batch) {
            let single = p.predict(row).unwrap();
            assert_eq!(single.class_index, pred.class_index);
        }
        assert!(p.predict_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let pred = Prediction::from_probabilities(vec![0.2, 0.4, 0.4], &labels()).unwrap();
        assert_eq!(pred.class_index, 1);
        assert_eq!(pred.label, "B (Open Palm)");
        assert_eq!(pred.top_k(2), vec![(1, 0.4), (2, 0.4)]);
        assert_eq!(pred.top_k(10).len(), 3);
    }

    #[test]
    fn test_label_count_mismatch() {
        let device = Default::default();
        let model = LandmarkClassifierConfig::new(4).init::<TestBackend>(&device);
        assert!(Predictor::from_parts(model, labels(), device).is_err());
    }

    #[test]
    fn test_load_from_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let config = LandmarkClassifierConfig::new(3);
        let model = config.init::<TestBackend>(&device);
        save_model(&model, &config, dir.path()).unwrap();
        labels().save(dir.path().join(LABELS_FILE)).unwrap();

        let p = Predictor::<TestBackend>::load(dir.path(), &device).unwrap();
        assert_eq!(p.num_classes(), 3);
        assert!(p.predict(&[0.5; FEATURE_DIM]).is_ok());

        let explicit = Predictor::<TestBackend>::load_from(
            &dir.path().join("model.mpk"),
            &dir.path().join("model_config.json"),
            &dir.path().join(LABELS_FILE),
            &device,
        )
        .unwrap();
        assert_eq!(explicit.labels(), p.labels());
    }

    #[test]
    fn test_load_rejects_inconsistent_labels() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let config = LandmarkClassifierConfig::new(2);
        save_model(&config.init::<TestBackend>(&device), &config, dir.path()).unwrap();
        labels().save(dir.path().join(LABELS_FILE)).unwrap();

        assert!(Predictor::<TestBackend>::load(dir.path(), &device).is_err());
    }
}
