use std::collections::BTreeMap;

use crate::dataset::{Dataset, Value};

/// Scores how informative a column is about the label.
///
/// Implementations must be pure: non-negative, zero for a column that says
/// nothing about the label, and identical for identical input. Any
/// `Fn(&Dataset, usize) -> f64` closure is a `GainFunction`.
pub trait GainFunction {
    /// Score `column` (a zero-based column index) on `dataset`.
    fn gain(&self, dataset: &Dataset, column: usize) -> f64;
}

impl<F> GainFunction for F
where
    F: Fn(&Dataset, usize) -> f64,
{
    fn gain(&self, dataset: &Dataset, column: usize) -> f64 {
        self(dataset, column)
    }
}

/// Shannon information gain (log base 2).
///
/// `H(label) - Σ_v (|S_v| / |S|) · H(label | column = v)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InformationGain;

impl GainFunction for InformationGain {
    fn gain(&self, dataset: &Dataset, column: usize) -> f64 {
        let n_rows = dataset.n_rows();
        if n_rows == 0 {
            return 0.0;
        }

        let total_counts: Vec<usize> = dataset.label_counts().into_values().collect();
        let parent = entropy(&total_counts, n_rows);

        let label = dataset.label_index();
        let mut by_value: BTreeMap<&Value, BTreeMap<&Value, usize>> = BTreeMap::new();
        for row in dataset.rows() {
            *by_value
                .entry(&row[column])
                .or_default()
                .entry(&row[label])
                .or_insert(0) += 1;
        }

        let n = n_rows as f64;
        let conditional: f64 = by_value
            .values()
            .map(|counts| {
                let n_v: usize = counts.values().sum();
                let counts: Vec<usize> = counts.values().copied().collect();
                (n_v as f64 / n) * entropy(&counts, n_v)
            })
            .sum();

        // Float noise can push a zero gain slightly negative.
        (parent - conditional).max(0.0)
    }
}

/// Shannon entropy in bits of a class-count vector.
///
/// Returns 0.0 when `n_samples` is zero.
#[must_use]
pub fn entropy(class_counts: &[usize], n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    -class_counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}
