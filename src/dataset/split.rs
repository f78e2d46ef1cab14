//! Train/test splitting
//!
//! Stratified split: every class is divided separately so the train and test
//! sets keep the class proportions of the full dataset. The split is
//! deterministic for a given seed.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, SignLangError};

/// Indices into the flattened dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split sample indices into train and test sets, stratified by label
///
/// `labels[i]` is the encoded class of sample `i`. For a class with `n`
/// samples, `round(n * test_fraction)` go to the test set, clamped so both
/// sides receive at least one sample.
pub fn stratified_split(labels: &[usize], test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SignLangError::Config(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    if labels.is_empty() {
        return Err(SignLangError::Dataset("no samples to split".to_string()));
    }

    // BTreeMap keeps class iteration order stable, and with it the RNG stream
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    if let Some((class, members)) = by_class.iter().find(|(_, m)| m.len() < 2) {
        return Err(SignLangError::Dataset(format!(
            "class {} has only {} sample(s); a stratified split needs at least 2 per class",
            class,
            members.len()
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut split = SplitIndices::default();

    for members in by_class.values_mut() {
        let n = members.len();
        let n_test = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);

        members.shuffle(&mut rng);
        split.test.extend_from_slice(&members[..n_test]);
        split.train.extend_from_slice(&members[n_test..]);
    }

    split.train.shuffle(&mut rng);
    split.test.shuffle(&mut rng);

    Ok(split)
}

/// Split off the last `fraction` of `indices` as a hold-out set
///
/// Returns `(kept, held_out)`. The hold-out starts at
/// `floor(len * (1 - fraction))`, so ordering is preserved on both sides.
pub fn holdout_tail(indices: &[usize], fraction: f64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&fraction) {
        return Err(SignLangError::Config(format!(
            "validation fraction must be in [0, 1), got {}",
            fraction
        )));
    }

    let split_at = (indices.len() as f64 * (1.0 - fraction)).floor() as usize;
    let (kept, held_out) = indices.split_at(split_at.min(indices.len()));
    Ok((kept.to_vec(), held_out.to_vec()))
}
