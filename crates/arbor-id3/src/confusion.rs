//! Confusion matrix and per-class classification metrics.

use std::collections::BTreeSet;
use std::fmt;

use crate::dataset::Value;
use crate::predict::Prediction;

/// A confusion matrix over label values.
///
/// Entry `matrix[i][j]` counts rows whose actual label is `labels[i]` and
/// whose prediction is `labels[j]`. Rows predicted [`Prediction::Unknown`]
/// are counted in `unknown[i]` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    labels: Vec<Value>,
    matrix: Vec<Vec<usize>>,
    unknown: Vec<usize>,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassMetrics {
    /// The class label.
    pub label: Value,
    /// Precision: TP / (TP + FP). 0.0 if no predictions for this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true samples for this class.
    /// Unknown predictions count as false negatives.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from parallel actual labels and predictions.
    ///
    /// Extra entries in the longer slice are ignored.
    #[must_use]
    pub fn from_predictions(actual: &[Value], predicted: &[Prediction]) -> Self {
        let labels: Vec<Value> = actual
            .iter()
            .chain(predicted.iter().filter_map(Prediction::label))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let position = |v: &Value| labels.binary_search(v).ok();

        let n = labels.len();
        let mut matrix = vec![vec![0usize; n]; n];
        let mut unknown = vec![0usize; n];
        for (a, p) in actual.iter().zip(predicted) {
            let Some(i) = position(a) else { continue };
            match p.label().and_then(position) {
                Some(j) => matrix[i][j] += 1,
                None => unknown[i] += 1,
            }
        }

        Self {
            labels,
            matrix,
            unknown,
        }
    }

    /// Overall accuracy in `[0, 1]`, or `None` when the matrix is empty.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let correct: usize = (0..self.labels.len()).map(|i| self.matrix[i][i]).sum();
        let total: usize = self.matrix.iter().flatten().sum::<usize>() + self.unknown.iter().sum::<usize>();
        (total > 0).then(|| correct as f64 / total as f64)
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.labels.len();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let fn_: usize = (0..n).filter(|&j| j != c).map(|j| self.matrix[c][j]).sum::<usize>()
                    + self.unknown[c];
                let support = tp + fn_;
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label: self.labels[c].clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the labels indexing rows and columns, ascending.
    #[must_use]
    pub fn labels(&self) -> &[Value] {
        &self.labels
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the per-actual-label count of unknown predictions.
    #[must_use]
    pub fn unknown_counts(&self) -> &[usize] {
        &self.unknown
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.to_string().len())
            .max()
            .unwrap_or(0)
            .max(7);

        write!(f, "{:>width$}", "")?;
        for label in &self.labels {
            write!(f, " {:>width$}", label.to_string())?;
        }
        writeln!(f, " {:>width$}", "unknown")?;

        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "{:>width$}", self.labels[i].to_string())?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f, " {:>width$}", self.unknown[i])?;
        }

        Ok(())
    }
}
