//! Burn Dataset Integration for landmark samples
//!
//! Implements Burn's `Dataset` trait and `Batcher` so the training loop can
//! pull shuffled index windows and turn them into `[batch, 63]` tensors.

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, SignLangError};
use crate::FEATURE_DIM;

/// A single encoded sample ready for Burn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkItem {
    /// Flattened landmark coordinates `[FEATURE_DIM]`
    pub features: Vec<f32>,
    /// Encoded class index
    pub label: usize,
}

/// In-memory dataset of encoded samples
#[derive(Clone, Debug, Default)]
pub struct LandmarkDataset {
    items: Vec<LandmarkItem>,
}

impl LandmarkDataset {
    /// Build from feature rows and their encoded labels
    pub fn new(features: Vec<Vec<f32>>, labels: Vec<usize>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(SignLangError::Dataset(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if let Some(idx) = features.iter().position(|f| f.len() != FEATURE_DIM) {
            return Err(SignLangError::Dataset(format!(
                "row {} has {} values, expected {}",
                idx,
                features[idx].len(),
                FEATURE_DIM
            )));
        }

        let items = features
            .into_iter()
            .zip(labels)
            .map(|(features, label)| LandmarkItem { features, label })
            .collect();
        Ok(Self { items })
    }

    /// Subset of `source` at the given indices, in that order
    pub fn select(source: &[LandmarkItem], indices: &[usize]) -> Self {
        let items = indices
            .iter()
            .filter_map(|&i| source.get(i).cloned())
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[LandmarkItem] {
        &self.items
    }

    pub fn labels(&self) -> Vec<usize> {
        self.items.iter().map(|i| i.label).collect()
    }
}

impl Dataset<LandmarkItem> for LandmarkDataset {
    fn get(&self, index: usize) -> Option<LandmarkItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// A batch of landmark features for training
#[derive(Clone, Debug)]
pub struct LandmarkBatch<B: Backend> {
    /// Features with shape `[batch_size, FEATURE_DIM]`
    pub features: Tensor<B, 2>,
    /// Labels with shape `[batch_size]`
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher for landmark batches
#[derive(Clone, Debug, Default)]
pub struct LandmarkBatcher;

impl LandmarkBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, LandmarkItem, LandmarkBatch<B>> for LandmarkBatcher {
    fn batch(&self, items: Vec<LandmarkItem>, device: &B::Device) -> LandmarkBatch<B> {
        let batch_size = items.len();

        let features_data: Vec<f32> = items.iter().flat_map(|item| item.features.iter().copied()).collect();
        let features = Tensor::<B, 2>::from_floats(
            TensorData::new(features_data, [batch_size, FEATURE_DIM]),
            device,
        );

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets =
            Tensor::<B, 1, Int>::from_data(TensorData::new(targets_data, [batch_size]), device);

        LandmarkBatch { features, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn rows(n: usize) -> Vec<Vec<f32>> {
        (0..n).map(|i| vec![i as f32; FEATURE_DIM]).collect()
    }

    #[test]
    fn test_dataset_rejects_mismatched_inputs() {
        assert!(LandmarkDataset::new(rows(3), vec![0, 1]).is_err());

        let mut bad = rows(2);
        bad[1].pop();
        let err = LandmarkDataset::new(bad, vec![0, 1]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_select_preserves_order() {
        let ds = LandmarkDataset::new(rows(5), vec![0, 1, 2, 3, 4]).unwrap();
        let sub = LandmarkDataset::select(ds.items(), &[4, 0, 2]);
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.labels(), vec![4, 0, 2]);
        assert_eq!(sub.get(0).unwrap().features[0], 4.0);
        assert!(sub.get(3).is_none());
    }

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let ds = LandmarkDataset::new(rows(3), vec![2, 0, 1]).unwrap();
        let batch: LandmarkBatch<TestBackend> =
            LandmarkBatcher::new().batch(ds.items().to_vec(), &device);

        assert_eq!(batch.features.dims(), [3, FEATURE_DIM]);
        assert_eq!(batch.targets.dims(), [3]);

        let targets = batch.targets.into_data().to_vec::<i64>().unwrap();
        assert_eq!(targets, vec![2, 0, 1]);
        let features = batch.features.into_data().to_vec::<f32>().unwrap();
        assert_eq!(features[FEATURE_DIM], 1.0);
    }
}
