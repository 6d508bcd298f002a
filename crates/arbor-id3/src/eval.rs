//! Held-out evaluation of a fitted tree.

use std::fmt;

use tracing::{info, instrument, trace};

use crate::confusion::ConfusionMatrix;
use crate::dataset::{Dataset, Value};
use crate::node::Tree;
use crate::predict::{Prediction, predict};

/// Accumulated results of scoring a tree on labeled rows.
///
/// Grows by one [`EvaluationReport::record`] call per row; `predictions`
/// and `actual` stay parallel to the rows in the order they were scored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    n_correct: usize,
    predictions: Vec<Prediction>,
    actual: Vec<Value>,
}

impl EvaluationReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one scored row.
    pub fn record(&mut self, prediction: Prediction, actual: Value) {
        if prediction.matches(&actual) {
            self.n_correct += 1;
        }
        self.predictions.push(prediction);
        self.actual.push(actual);
    }

    /// Return the number of rows scored.
    #[must_use]
    pub fn n_total(&self) -> usize {
        self.predictions.len()
    }

    /// Return the number of exact matches.
    #[must_use]
    pub fn n_correct(&self) -> usize {
        self.n_correct
    }

    /// Return the number of misses, unknown predictions included.
    #[must_use]
    pub fn n_incorrect(&self) -> usize {
        self.n_total() - self.n_correct
    }

    /// Return how many rows fell back to [`Prediction::Unknown`].
    #[must_use]
    pub fn n_unknown(&self) -> usize {
        self.predictions.iter().filter(|p| p.is_unknown()).count()
    }

    /// Return accuracy as a percentage in `[0, 100]`, or `None` when no rows were scored.
    #[must_use]
    pub fn accuracy_percent(&self) -> Option<f64> {
        let total = self.n_total();
        (total > 0).then(|| self.n_correct as f64 / total as f64 * 100.0)
    }

    /// Return the raw predictions in row order.
    #[must_use]
    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Return the actual labels in row order.
    #[must_use]
    pub fn actual(&self) -> &[Value] {
        &self.actual
    }

    /// Build the confusion matrix of actual vs. predicted labels.
    #[must_use]
    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix::from_predictions(&self.actual, &self.predictions)
    }
}

/// `Correct Answers : 3 | Bad Guesses: 1 | Success Rate: 75.0000%`
impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Correct Answers : {} | Bad Guesses: {} | Success Rate: ",
            self.n_correct(),
            self.n_incorrect()
        )?;
        match self.accuracy_percent() {
            Some(pct) => write!(f, "{pct:.4}%"),
            None => f.write_str("undefined"),
        }
    }
}

/// Predict every row of `test` in order and score it against the row's label.
///
/// Each probe record carries every column of the row, label included.
/// Rows that cannot be routed count as incorrect; evaluation never aborts.
#[instrument(skip_all, fields(n_rows = test.n_rows()))]
pub fn evaluate(tree: &Tree, test: &Dataset) -> EvaluationReport {
    let mut report = EvaluationReport::new();
    for row in 0..test.n_rows() {
        let prediction = predict(tree, &test.record(row));
        trace!(row, %prediction, actual = %test.label(row), "row scored");
        report.record(prediction, test.label(row).clone());
    }

    info!(
        n_correct = report.n_correct(),
        n_incorrect = report.n_incorrect(),
        n_unknown = report.n_unknown(),
        accuracy_percent = ?report.accuracy_percent(),
        "evaluation complete"
    );

    report
}
