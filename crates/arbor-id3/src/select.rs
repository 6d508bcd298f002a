use tracing::trace;

use crate::dataset::Dataset;
use crate::error::Id3Error;
use crate::gain::GainFunction;

/// The winning splitting column and its gain.
#[derive(Debug, Clone, PartialEq)]
pub struct BestColumn {
    /// Zero-based index of the column in the dataset.
    pub index: usize,
    /// Gain scored by the gain function.
    pub gain: f64,
}

/// Score every non-label column and return the most informative one.
///
/// Candidates are scanned left to right and only a strictly greater gain
/// replaces the current best, so the first column reaching the maximum wins.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`Id3Error::EmptyDataset`] | `dataset` has zero rows |
/// | [`Id3Error::ZeroFeatures`] | `dataset` has only the label column |
/// | [`Id3Error::NonFiniteGain`] | the gain function returned NaN or infinity |
pub fn select_best_column<G: GainFunction + ?Sized>(
    dataset: &Dataset,
    gain_fn: &G,
) -> Result<BestColumn, Id3Error> {
    if dataset.is_empty() {
        return Err(Id3Error::EmptyDataset);
    }

    let mut best: Option<BestColumn> = None;
    for (index, name) in dataset.feature_columns().iter().enumerate() {
        let gain = gain_fn.gain(dataset, index);
        if !gain.is_finite() {
            return Err(Id3Error::NonFiniteGain {
                column: name.clone(),
                value: gain,
            });
        }
        trace!(column = %name, gain, "scored column");
        match &best {
            Some(current) if gain <= current.gain => {}
            _ => best = Some(BestColumn { index, gain }),
        }
    }

    best.ok_or_else(|| Id3Error::ZeroFeatures {
        label: dataset.label_column().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use crate::gain::InformationGain;

    fn dataset(columns: &[&str], rows: &[&[i64]]) -> Dataset {
        Dataset::new(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|&v| Value::Bucket(v)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn picks_highest_gain() {
        // b determines y, a is noise.
        let ds = dataset(&["a", "b", "y"], &[&[0, 0, 0], &[1, 0, 0], &[0, 1, 1], &[1, 1, 1]]);
        let best = select_best_column(&ds, &InformationGain).unwrap();
        assert_eq!(best.index, 1);
        assert!((best.gain - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_first_column() {
        let ds = dataset(&["a", "b", "c", "y"], &[&[0, 0, 0, 0]]);
        let flat = |_: &Dataset, _: usize| 0.5;
        let best = select_best_column(&ds, &flat).unwrap();
        assert_eq!(best.index, 0);
        assert!((best.gain - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn later_strictly_greater_gain_wins() {
        let ds = dataset(&["a", "b", "c", "y"], &[&[0, 0, 0, 0]]);
        let scores = |_: &Dataset, column: usize| [0.2, 0.7, 0.7][column];
        let best = select_best_column(&ds, &scores).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn label_column_never_scored() {
        let ds = dataset(&["a", "y"], &[&[0, 1]]);
        let scores = |_: &Dataset, column: usize| {
            assert_ne!(column, 1, "label column must not be scored");
            0.0
        };
        assert_eq!(select_best_column(&ds, &scores).unwrap().index, 0);
    }

    #[test]
    fn zero_features_error() {
        let ds = dataset(&["y"], &[&[1]]);
        let err = select_best_column(&ds, &InformationGain).unwrap_err();
        assert!(matches!(err, Id3Error::ZeroFeatures { label } if label == "y"));
    }

    #[test]
    fn empty_dataset_error() {
        let ds = dataset(&["a", "y"], &[]);
        let err = select_best_column(&ds, &InformationGain).unwrap_err();
        assert!(matches!(err, Id3Error::EmptyDataset));
    }

    #[test]
    fn non_finite_gain_error() {
        let ds = dataset(&["a", "y"], &[&[0, 1]]);
        let nan = |_: &Dataset, _: usize| f64::NAN;
        let err = select_best_column(&ds, &nan).unwrap_err();
        assert!(matches!(err, Id3Error::NonFiniteGain { .. }));
    }
}
