//! Stratified train/test holdout split.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::dataset::{Dataset, Value};
use crate::error::Id3Error;

/// The two halves of a holdout split.
#[derive(Debug, Clone)]
pub struct Holdout {
    /// Rows used for induction.
    pub train: Dataset,
    /// Rows held out for evaluation.
    pub test: Dataset,
}

/// Split `dataset` into train and test sets with matching label proportions.
///
/// Rows are grouped by label, shuffled within each group, and
/// `round(group_len * test_fraction)` rows of each group are held out.
/// Both halves keep the original row order.
///
/// # Errors
///
/// Returns [`Id3Error::InvalidTestFraction`] if `test_fraction` is not in (0.0, 1.0).
#[instrument(skip(dataset), fields(n_rows = dataset.n_rows()))]
pub fn stratified_holdout(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<Holdout, Id3Error> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Id3Error::InvalidTestFraction {
            fraction: test_fraction,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // Group indices by label.
    let mut by_label: BTreeMap<&Value, Vec<usize>> = BTreeMap::new();
    for row in 0..dataset.n_rows() {
        by_label.entry(dataset.label(row)).or_default().push(row);
    }

    let mut held_out = vec![false; dataset.n_rows()];
    for indices in by_label.values_mut() {
        indices.shuffle(&mut rng);
        let n_test = (indices.len() as f64 * test_fraction).round() as usize;
        for &idx in indices.iter().take(n_test) {
            held_out[idx] = true;
        }
    }

    let (test_rows, train_rows): (Vec<_>, Vec<_>) = dataset
        .rows()
        .iter()
        .zip(&held_out)
        .partition(|&(_, &is_test)| is_test);

    let collect = |rows: Vec<(&Vec<Value>, &bool)>| -> Vec<Vec<Value>> {
        rows.into_iter().map(|(row, _)| row.clone()).collect()
    };
    let train = dataset.with_rows(collect(train_rows));
    let test = dataset.with_rows(collect(test_rows));

    debug!(
        n_train = train.n_rows(),
        n_test = test.n_rows(),
        "holdout split"
    );

    Ok(Holdout { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(n_per_class: usize) -> Dataset {
        let rows = (0..n_per_class * 2)
            .map(|i| {
                vec![
                    Value::Bucket(i as i64),
                    Value::category(if i % 2 == 0 { "even" } else { "odd" }),
                ]
            })
            .collect();
        Dataset::new(vec!["id".to_string(), "y".to_string()], rows).unwrap()
    }

    #[test]
    fn invalid_fraction() {
        let ds = labeled(5);
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                stratified_holdout(&ds, fraction, 42),
                Err(Id3Error::InvalidTestFraction { .. })
            ));
        }
    }

    #[test]
    fn stratifies_by_label() {
        let ds = labeled(10);
        let split = stratified_holdout(&ds, 0.3, 42).unwrap();
        assert_eq!(split.test.n_rows(), 6);
        assert_eq!(split.train.n_rows(), 14);
        let counts = split.test.label_counts();
        assert_eq!(counts.values().copied().collect::<Vec<_>>(), vec![3, 3]);
    }

    #[test]
    fn halves_preserve_order_and_cover_every_row() {
        let ds = labeled(10);
        let split = stratified_holdout(&ds, 0.25, 7).unwrap();
        let ids = |d: &Dataset| -> Vec<Value> { (0..d.n_rows()).map(|r| d.value(r, 0).clone()).collect() };
        let train_ids = ids(&split.train);
        let test_ids = ids(&split.test);
        assert!(train_ids.windows(2).all(|w| w[0] < w[1]));
        assert!(test_ids.windows(2).all(|w| w[0] < w[1]));

        let mut all: Vec<Value> = train_ids.into_iter().chain(test_ids).collect();
        all.sort();
        assert_eq!(all, ids(&ds));
    }

    #[test]
    fn same_seed_same_split() {
        let ds = labeled(10);
        let a = stratified_holdout(&ds, 0.4, 99).unwrap();
        let b = stratified_holdout(&ds, 0.4, 99).unwrap();
        assert_eq!(a.test, b.test);
    }
}
