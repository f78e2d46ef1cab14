//! Evaluation metrics for the sign classifier
//!
//! Built from paired (predicted, actual) class indices. Used for the test
//! split at the end of training and by `signlang infer --dataset`.

use serde::{Deserialize, Serialize};

/// Summary of a classifier's predictions over a labelled set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub samples: usize,
    pub correct: usize,
    pub accuracy: f64,
    /// Mean cross-entropy, when the caller computed one
    pub loss: Option<f64>,
    /// Unweighted mean F1 over classes that occur in the ground truth
    pub macro_f1: f64,
    pub classes: Vec<ClassReport>,
    pub confusion: ConfusionMatrix,
}

impl Metrics {
    /// Pair `predictions[i]` with `actual[i]`; the longer slice is truncated
    pub fn from_predictions(predictions: &[usize], actual: &[usize], num_classes: usize) -> Self {
        let mut confusion = ConfusionMatrix::new(num_classes);
        for (&predicted, &truth) in predictions.iter().zip(actual) {
            confusion.record(truth, predicted);
        }

        let samples = confusion.total();
        let correct = confusion.diagonal();
        let classes: Vec<ClassReport> = (0..num_classes)
            .map(|class| ClassReport::from_confusion(&confusion, class))
            .collect();

        let present: Vec<f64> = classes.iter().filter(|c| c.support > 0).map(|c| c.f1).collect();
        let macro_f1 = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };

        Self {
            samples,
            correct,
            accuracy: safe_div(correct, samples),
            loss: None,
            macro_f1,
            classes,
            confusion,
        }
    }

    /// Name each class report after its label
    pub fn with_class_names(mut self, names: &[String]) -> Self {
        for report in &mut self.classes {
            if let Some(name) = names.get(report.index) {
                report.label = name.clone();
            }
        }
        self
    }

    pub fn with_loss(mut self, loss: f64) -> Self {
        self.loss = Some(loss);
        self
    }

    /// Classification report followed by the confusion matrix
    pub fn display(&self) -> String {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(5);

        let mut out = format!(
            "Accuracy: {:.2}% ({}/{})  Macro F1: {:.4}",
            self.accuracy * 100.0,
            self.correct,
            self.samples,
            self.macro_f1
        );
        if let Some(loss) = self.loss {
            out.push_str(&format!("  Loss: {:.4}", loss));
        }
        out.push('\n');

        out.push_str(&format!(
            "  {:<width$} {:>9} {:>9} {:>9} {:>8}\n",
            "label", "precision", "recall", "f1", "support"
        ));
        for c in &self.classes {
            out.push_str(&format!(
                "  {:<width$} {:>9.4} {:>9.4} {:>9.4} {:>8}\n",
                c.label, c.precision, c.recall, c.f1, c.support
            ));
        }

        out.push_str("Confusion (rows = actual, columns = predicted):\n");
        for (c, row) in self.classes.iter().zip(self.confusion.rows()) {
            let cells: Vec<String> = row.iter().map(|n| format!("{:>5}", n)).collect();
            out.push_str(&format!("  {:<width$} {}\n", c.label, cells.join("")));
        }
        out
    }
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassReport {
    pub index: usize,
    /// Label string, or the index until names are attached
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Samples whose actual class is this one
    pub support: usize,
}

impl ClassReport {
    fn from_confusion(confusion: &ConfusionMatrix, index: usize) -> Self {
        let hits = confusion.count(index, index);
        let predicted = confusion.predicted_total(index);
        let support = confusion.actual_total(index);

        let precision = safe_div(hits, predicted);
        let recall = safe_div(hits, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            index,
            label: index.to_string(),
            precision,
            recall,
            f1,
            support,
        }
    }
}

fn safe_div(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Square count matrix indexed `[actual][predicted]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; num_classes]; num_classes],
        }
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    /// Count one prediction; indices outside the matrix are dropped
    pub fn record(&mut self, actual: usize, predicted: usize) {
        if let Some(cell) = self.counts.get_mut(actual).and_then(|row| row.get_mut(predicted)) {
            *cell += 1;
        }
    }

    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.counts
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn actual_total(&self, class: usize) -> usize {
        self.counts.get(class).map(|row| row.iter().sum()).unwrap_or(0)
    }

    pub fn predicted_total(&self, class: usize) -> usize {
        self.counts.iter().filter_map(|row| row.get(class)).sum()
    }

    pub fn diagonal(&self) -> usize {
        (0..self.num_classes()).map(|i| self.count(i, i)).sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}
