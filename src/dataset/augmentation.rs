//! Dataset balancing through noise-perturbed duplication
//!
//! Under-represented classes are topped up to a target count by copying
//! randomly chosen captures of the same class and jittering every landmark
//! coordinate with uniform noise. Original samples are never modified.
//!
//! # Strategy
//!
//! - Only captures present in the input are used as templates, so synthetic
//!   samples never seed further synthetic samples.
//! - Each coordinate gets an independent draw from `[-noise, +noise]`.
//! - With a fixed seed the output is fully reproducible.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::loader::{class_distribution, LandmarkSample};
use crate::utils::error::{Result, SignLangError};

/// Default per-coordinate noise amplitude
pub const DEFAULT_NOISE_LEVEL: f64 = 0.01;

/// Configuration for dataset balancing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Classes to top up, in processing order; empty means every class in
    /// first-appearance order
    pub classes: Vec<String>,
    /// Desired sample count per class; `None` uses the largest class size
    pub target_count: Option<usize>,
    /// Half-width of the uniform noise added to each coordinate
    pub noise_level: f64,
    /// Seed for reproducible output; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            target_count: None,
            noise_level: DEFAULT_NOISE_LEVEL,
            seed: None,
        }
    }
}

impl AugmentConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(SignLangError::Config(format!(
                "noise level must be a finite value >= 0, got {}",
                self.noise_level
            )));
        }
        Ok(())
    }
}

/// What happened to one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassAugmentation {
    pub class: String,
    pub existing: usize,
    pub added: usize,
}

/// Summary of an augmentation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct AugmentReport {
    pub target_count: usize,
    pub classes: Vec<ClassAugmentation>,
}

impl AugmentReport {
    pub fn total_added(&self) -> usize {
        self.classes.iter().map(|c| c.added).sum()
    }
}

/// Balance `samples` according to `config`
///
/// The returned vector holds all input samples in their original order,
/// followed by the synthetic samples grouped by class in processing order.
pub fn augment(
    samples: &[LandmarkSample],
    config: &AugmentConfig,
) -> Result<(Vec<LandmarkSample>, AugmentReport)> {
    config.validate()?;

    let distribution = class_distribution(samples);
    let target_count = config
        .target_count
        .or_else(|| distribution.largest().map(|(_, c)| c))
        .unwrap_or(0);

    let classes: Vec<String> = if config.classes.is_empty() {
        distribution.counts.iter().map(|(l, _)| l.clone()).collect()
    } else {
        config.classes.clone()
    };

    let mut by_class: HashMap<&str, Vec<&LandmarkSample>> = HashMap::new();
    for sample in samples {
        by_class.entry(sample.label.as_str()).or_default().push(sample);
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut output = samples.to_vec();
    let mut report = AugmentReport {
        target_count,
        classes: Vec::with_capacity(classes.len()),
    };

    for class in &classes {
        let templates = by_class.get(class.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        let existing = templates.len();
        let to_add = target_count.saturating_sub(existing);

        if to_add == 0 || templates.is_empty() {
            info!("No augmentation needed for {}.", class);
            report.classes.push(ClassAugmentation {
                class: class.clone(),
                existing,
                added: 0,
            });
            continue;
        }

        for _ in 0..to_add {
            let Some(base) = templates.choose(&mut rng) else {
                break;
            };
            output.push(jitter(base, config.noise_level, &mut rng));
        }

        info!("Augmented {}: added {} samples.", class, to_add);
        report.classes.push(ClassAugmentation {
            class: class.clone(),
            existing,
            added: to_add,
        });
    }

    Ok((output, report))
}

/// Copy `sample` with every coordinate shifted by uniform noise
fn jitter<R: Rng>(sample: &LandmarkSample, noise: f64, rng: &mut R) -> LandmarkSample {
    let mut copy = sample.clone();
    for lm in &mut copy.landmarks {
        lm.x += rng.gen_range(-1.0f64..=1.0) * noise;
        lm.y += rng.gen_range(-1.0f64..=1.0) * noise;
        lm.z += rng.gen_range(-1.0f64..=1.0) * noise;
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::loader::tests::synthetic_hand;

    fn dataset(counts: &[(&str, usize)]) -> Vec<LandmarkSample> {
        counts
            .iter()
            .flat_map(|(label, n)| {
                (0..*n).map(move |i| LandmarkSample::new(*label, synthetic_hand(i as f64)))
            })
            .collect()
    }

    fn seeded(classes: &[&str], target: Option<usize>) -> AugmentConfig {
        AugmentConfig {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            target_count: target,
            noise_level: 0.01,
            seed: Some(42),
        }
    }

    #[test]
    fn test_tops_up_selected_classes() {
        let input = dataset(&[("A (Fist)", 3), ("B (Open Palm)", 10), ("C (C-shape)", 6)]);
        let (output, report) = augment(&input, &seeded(&["A (Fist)", "C (C-shape)"], Some(10))).unwrap();

        let dist = class_distribution(&output);
        assert_eq!(dist.count("A (Fist)"), 10);
        assert_eq!(dist.count("B (Open Palm)"), 10);
        assert_eq!(dist.count("C (C-shape)"), 10);
        assert_eq!(report.total_added(), 11);
        assert_eq!(report.classes[0].added, 7);
        assert_eq!(report.classes[1].added, 4);
    }

    #[test]
    fn test_originals_kept_in_order_and_synthetic_appended() {
        let input = dataset(&[("A (Fist)", 2), ("V (Peace)", 4)]);
        let (output, _) = augment(&input, &seeded(&["A (Fist)"], Some(4))).unwrap();

        assert_eq!(&output[..input.len()], &input[..]);
        assert!(output[input.len()..].iter().all(|s| s.label == "A (Fist)"));
    }

    #[test]
    fn test_noise_is_bounded_and_applied_to_every_coordinate() {
        let input = dataset(&[("L (L-shape)", 1), ("V (Peace)", 3)]);
        let (output, _) = augment(&input, &seeded(&["L (L-shape)"], Some(3))).unwrap();

        let base = &input[0];
        for synthetic in &output[input.len()..] {
            assert_eq!(synthetic.landmarks.len(), base.landmarks.len());
            for (s, b) in synthetic.landmarks.iter().zip(&base.landmarks) {
                for (sv, bv) in [(s.x, b.x), (s.y, b.y), (s.z, b.z)] {
                    assert!((sv - bv).abs() <= 0.01 + 1e-12);
                }
            }
            assert_ne!(synthetic.landmarks, base.landmarks);
        }
    }

    #[test]
    fn test_default_targets_largest_class_for_all_classes() {
        let input = dataset(&[("A (Fist)", 2), ("B (Open Palm)", 5), ("C (C-shape)", 4)]);
        let config = AugmentConfig {
            seed: Some(1),
            ..AugmentConfig::default()
        };
        let (output, report) = augment(&input, &config).unwrap();

        assert_eq!(report.target_count, 5);
        let dist = class_distribution(&output);
        assert!(dist.counts.iter().all(|(_, c)| *c == 5));
    }

    #[test]
    fn test_missing_or_full_class_is_untouched() {
        let input = dataset(&[("A (Fist)", 5)]);
        let (output, report) = augment(&input, &seeded(&["A (Fist)", "Z (Missing)"], Some(3))).unwrap();

        assert_eq!(output.len(), 5);
        assert_eq!(report.total_added(), 0);
        assert_eq!(report.classes[1].existing, 0);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let input = dataset(&[("A (Fist)", 2), ("B (Open Palm)", 6)]);
        let config = seeded(&["A (Fist)"], Some(6));
        let (a, _) = augment(&input, &config).unwrap();
        let (b, _) = augment(&input, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_noise_duplicates_exactly() {
        let input = dataset(&[("A (Fist)", 1), ("B (Open Palm)", 2)]);
        let config = AugmentConfig {
            noise_level: 0.0,
            ..seeded(&["A (Fist)"], Some(2))
        };
        let (output, _) = augment(&input, &config).unwrap();
        assert_eq!(output[3], input[0]);
    }

    #[test]
    fn test_huge_finite_noise_does_not_panic() {
        let input = dataset(&[("A (Fist)", 1), ("B (Open Palm)", 2)]);
        let config = AugmentConfig {
            noise_level: 1e308,
            ..seeded(&["A (Fist)"], Some(2))
        };
        assert!(config.validate().is_ok());

        let (output, report) = augment(&input, &config).unwrap();
        assert_eq!(report.total_added(), 1);
        let synthetic = &output[input.len()];
        for (s, b) in synthetic.landmarks.iter().zip(&input[0].landmarks) {
            assert!(s.x.is_finite() && s.y.is_finite() && s.z.is_finite());
            assert!((s.x - b.x).abs() <= 1e308);
        }
    }

    #[test]
    fn test_rejects_invalid_noise() {
        let input = dataset(&[("A (Fist)", 1)]);
        for noise in [-0.1, f64::NAN, f64::INFINITY] {
            let config = AugmentConfig {
                noise_level: noise,
                ..AugmentConfig::default()
            };
            assert!(augment(&input, &config).is_err());
        }
    }
}
