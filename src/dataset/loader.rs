//! Landmark Dataset Loader
//!
//! Reads and writes the captured sign-language dataset: a JSON array of
//! `{ "label": ..., "landmarks": [{ "x", "y", "z" }, ...] }` records, one per
//! captured hand pose. Also owns the flatten step that turns 21 landmarks
//! into the 63-float feature vector used by both training and serving.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::utils::error::{read_json, Result, SignLangError};
use crate::{FEATURE_DIM, NUM_LANDMARKS};

/// A single hand landmark in normalized image coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Any other keys the capture tool wrote (e.g. `visibility`), kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            extra: Map::new(),
        }
    }
}

/// One labeled capture: a class label and its hand landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSample {
    pub label: String,
    pub landmarks: Vec<Landmark>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LandmarkSample {
    pub fn new(label: impl Into<String>, landmarks: Vec<Landmark>) -> Self {
        Self {
            label: label.into(),
            landmarks,
            extra: Map::new(),
        }
    }

    /// Flattened 63-float feature vector for this sample
    pub fn features(&self) -> Result<Vec<f32>> {
        flatten_landmarks(&self.landmarks)
    }
}

/// Load a dataset file
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<LandmarkSample>> {
    let path = path.as_ref();
    let samples: Vec<LandmarkSample> = read_json(path)?;

    info!("Loaded {} samples from {:?}", samples.len(), path);
    Ok(samples)
}

/// Write a dataset file as pretty-printed JSON (2-space indent)
pub fn save_samples<P: AsRef<Path>>(path: P, samples: &[LandmarkSample]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, samples)?;
    writer.flush()?;

    info!("Saved {} samples to {:?}", samples.len(), path);
    Ok(())
}

/// Flatten 21 landmarks into `[x0, y0, z0, x1, y1, z1, ...]`
///
/// This ordering is shared by training and serving; changing it invalidates
/// every trained model.
pub fn flatten_landmarks(landmarks: &[Landmark]) -> Result<Vec<f32>> {
    if landmarks.len() != NUM_LANDMARKS {
        return Err(SignLangError::Dataset(format!(
            "expected {} landmarks, got {}",
            NUM_LANDMARKS,
            landmarks.len()
        )));
    }

    let mut features = Vec::with_capacity(FEATURE_DIM);
    for lm in landmarks {
        features.extend([lm.x as f32, lm.y as f32, lm.z as f32]);
    }
    Ok(features)
}

/// Inverse of [`flatten_landmarks`]
pub fn unflatten_features(features: &[f32]) -> Result<Vec<Landmark>> {
    if features.len() != FEATURE_DIM {
        return Err(SignLangError::InvalidInput(format!(
            "expected {} values, got {}",
            FEATURE_DIM,
            features.len()
        )));
    }

    Ok(features
        .chunks_exact(3)
        .map(|c| Landmark::new(c[0] as f64, c[1] as f64, c[2] as f64))
        .collect())
}

/// Flatten every sample, returning feature rows and their labels in order
pub fn flatten_samples(samples: &[LandmarkSample]) -> Result<(Vec<Vec<f32>>, Vec<String>)> {
    let mut features = Vec::with_capacity(samples.len());
    let mut labels = Vec::with_capacity(samples.len());

    for (idx, sample) in samples.iter().enumerate() {
        let row = sample.features().map_err(|e| {
            SignLangError::Dataset(format!("sample {} ('{}'): {}", idx, sample.label, e))
        })?;
        features.push(row);
        labels.push(sample.label.clone());
    }

    debug!("Flattened {} samples into {}-float rows", samples.len(), FEATURE_DIM);
    Ok((features, labels))
}

/// Per-label sample counts in first-appearance order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassDistribution {
    pub counts: Vec<(String, usize)>,
}

impl ClassDistribution {
    /// Count of a given label (0 if absent)
    pub fn count(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// The most populated class, first one wins on ties
    pub fn largest(&self) -> Option<(&str, usize)> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (l, c)| match best {
                Some((_, bc)) if bc >= *c => best,
                _ => Some((l.as_str(), *c)),
            })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }
}

/// Count samples per label
pub fn class_distribution(samples: &[LandmarkSample]) -> ClassDistribution {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for sample in samples {
        match index.get(sample.label.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(sample.label.as_str(), counts.len());
                counts.push((sample.label.clone(), 1));
            }
        }
    }

    ClassDistribution { counts }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A hand whose landmark `i` sits at `(base + i, base + 2i, base + 3i) / 100`
    pub(crate) fn synthetic_hand(base: f64) -> Vec<Landmark> {
        (0..NUM_LANDMARKS)
            .map(|i| {
                let i = i as f64;
                Landmark::new((base + i) / 100.0, (base + 2.0 * i) / 100.0, (base + 3.0 * i) / 100.0)
            })
            .collect()
    }

    #[test]
    fn test_flatten_order() {
        let hand = synthetic_hand(0.0);
        let flat = flatten_landmarks(&hand).unwrap();

        assert_eq!(flat.len(), FEATURE_DIM);
        // landmark 1 occupies slots 3..6 as x, y, z
        assert_eq!(flat[3], 0.01);
        assert_eq!(flat[4], 0.02);
        assert_eq!(flat[5], 0.03);
        assert_eq!(flat[62], 0.60);
    }

    #[test]
    fn test_flatten_rejects_wrong_count() {
        let mut hand = synthetic_hand(0.0);
        hand.pop();
        let err = flatten_landmarks(&hand).unwrap_err();
        assert!(err.to_string().contains("got 20"));
    }

    #[test]
    fn test_unflatten_roundtrip() {
        let hand = synthetic_hand(5.0);
        let flat = flatten_landmarks(&hand).unwrap();
        let back = unflatten_features(&flat).unwrap();
        assert_eq!(flatten_landmarks(&back).unwrap(), flat);
        assert!(unflatten_features(&flat[..60]).is_err());
    }

    #[test]
    fn test_flatten_samples_reports_index() {
        let samples = vec![
            LandmarkSample::new("A (Fist)", synthetic_hand(0.0)),
            LandmarkSample::new("B (Open Palm)", vec![Landmark::new(0.0, 0.0, 0.0)]),
        ];
        let err = flatten_samples(&samples).unwrap_err();
        assert!(err.to_string().contains("sample 1"));
    }

    #[test]
    fn test_extra_fields_preserved() {
        let json = r#"[{"label":"A","landmarks":[{"x":0.1,"y":0.2,"z":0.3,"visibility":0.9}],"session":7}]"#;
        let samples: Vec<LandmarkSample> = serde_json::from_str(json).unwrap();

        assert_eq!(samples[0].landmarks[0].extra["visibility"], 0.9);
        let out = serde_json::to_value(&samples).unwrap();
        assert_eq!(out[0]["session"], 7);
        assert_eq!(out[0]["landmarks"][0]["visibility"], 0.9);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dataset.json");
        let samples = vec![LandmarkSample::new("L (L-shape)", synthetic_hand(1.0))];

        save_samples(&path, &samples).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {"), "expected 2-space indented output");
        assert_eq!(load_samples(&path).unwrap(), samples);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_samples("/no/such/dataset.json").unwrap_err();
        assert!(matches!(err, SignLangError::PathNotFound(_)));
    }

    #[test]
    fn test_class_distribution_order_and_largest() {
        let samples: Vec<_> = ["V (Peace)", "A (Fist)", "V (Peace)", "C (C-shape)", "A (Fist)"]
            .iter()
            .map(|l| LandmarkSample::new(*l, Vec::new()))
            .collect();
        let dist = class_distribution(&samples);

        assert_eq!(dist.counts[0], ("V (Peace)".to_string(), 2));
        assert_eq!(dist.counts[1], ("A (Fist)".to_string(), 2));
        assert_eq!(dist.count("C (C-shape)"), 1);
        assert_eq!(dist.count("missing"), 0);
        assert_eq!(dist.largest(), Some(("V (Peace)", 2)));
        assert_eq!(dist.total(), 5);
        assert_eq!(dist.num_classes(), 3);
    }
}
