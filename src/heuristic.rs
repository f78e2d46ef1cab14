//! Rule-based sign classifier
//!
//! A threshold classifier over 2D wrist-to-fingertip distances, used by the
//! data-collection client as a live demo before a model exists and by the
//! `baseline` command as a reference point for trained models. Rules are
//! checked in order and the first match wins.

use serde::Serialize;

use crate::dataset::{Landmark, LandmarkSample};
use crate::NUM_LANDMARKS;

/// Labels offered by the data-collection client
pub const SIGN_LABELS: [&str; 5] = ["A (Fist)", "B (Open Palm)", "C (C-shape)", "V (Peace)", "L (L-shape)"];

const WRIST: usize = 0;
const THUMB_TIP: usize = 4;
const INDEX_TIP: usize = 8;
const MIDDLE_TIP: usize = 12;
const RING_TIP: usize = 16;
const PINKY_TIP: usize = 20;
const TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

const CURLED: f64 = 0.15;
const OPEN: f64 = 0.25;
const C_REACH: f64 = 0.18;
const C_PINCH: f64 = 0.13;
const EXTENDED: f64 = 0.22;
const THUMB_OUT: f64 = 0.18;

fn dist2d(a: &Landmark, b: &Landmark) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Classify a hand, or `None` if there are not 21 landmarks or no rule fires
pub fn classify(landmarks: &[Landmark]) -> Option<&'static str> {
    if landmarks.len() != NUM_LANDMARKS {
        return None;
    }

    let wrist = &landmarks[WRIST];
    let reach = |tip: usize| dist2d(&landmarks[tip], wrist);
    let tips: Vec<f64> = TIPS.iter().map(|&t| reach(t)).collect();

    if tips.iter().all(|&d| d < CURLED) {
        return Some(SIGN_LABELS[0]);
    }
    if tips.iter().all(|&d| d > OPEN) {
        return Some(SIGN_LABELS[1]);
    }

    let pinch = dist2d(&landmarks[THUMB_TIP], &landmarks[INDEX_TIP]);
    if tips.iter().all(|&d| d > C_REACH) && pinch < C_PINCH {
        return Some(SIGN_LABELS[2]);
    }

    let (thumb, index, middle, ring, pinky) = (tips[0], tips[1], tips[2], tips[3], tips[4]);

    if index > EXTENDED && middle > EXTENDED && ring < CURLED && pinky < CURLED && thumb < THUMB_OUT {
        return Some(SIGN_LABELS[3]);
    }
    if index > EXTENDED && thumb > THUMB_OUT && middle < CURLED && ring < CURLED && pinky < CURLED {
        return Some(SIGN_LABELS[4]);
    }

    None
}

/// How the rules fare against a labeled dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaselineReport {
    pub total: usize,
    /// Samples for which some rule fired
    pub matched: usize,
    pub correct: usize,
}

impl BaselineReport {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Run [`classify`] over every sample and compare with its label
pub fn evaluate_baseline(samples: &[LandmarkSample]) -> BaselineReport {
    samples.iter().fold(BaselineReport::default(), |mut report, sample| {
        report.total += 1;
        if let Some(label) = classify(&sample.landmarks) {
            report.matched += 1;
            if label == sample.label {
                report.correct += 1;
            }
        }
        report
    })
}
