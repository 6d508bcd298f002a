use crate::dataset::{Dataset, Value};

/// Default cap on the number of rows a single branch keeps.
pub const DEFAULT_MAX_BRANCH_ROWS: usize = 100;

/// Return the rows where `column == value`, in original order, keeping at
/// most the first `max_rows` matches.
///
/// The cap bounds recursion cost on skewed branches at the price of
/// ignoring later matches. The input dataset is never modified.
#[must_use]
pub fn subset_where(dataset: &Dataset, column: usize, value: &Value, max_rows: usize) -> Dataset {
    let rows: Vec<Vec<Value>> = dataset
        .rows()
        .iter()
        .filter(|row| &row[column] == value)
        .take(max_rows)
        .cloned()
        .collect();
    dataset.with_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: Vec<(i64, i64)>) -> Dataset {
        Dataset::new(
            vec!["a".to_string(), "y".to_string()],
            rows.into_iter()
                .map(|(a, y)| vec![Value::Bucket(a), Value::Bucket(y)])
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn keeps_matching_rows_in_order() {
        let ds = dataset(vec![(1, 10), (0, 11), (1, 12), (1, 13)]);
        let sub = subset_where(&ds, 0, &Value::Bucket(1), DEFAULT_MAX_BRANCH_ROWS);
        let labels: Vec<&Value> = (0..sub.n_rows()).map(|r| sub.label(r)).collect();
        assert_eq!(labels, vec![&Value::Bucket(10), &Value::Bucket(12), &Value::Bucket(13)]);
        assert_eq!(sub.columns(), ds.columns());
    }

    #[test]
    fn no_match_yields_empty_subset() {
        let ds = dataset(vec![(1, 10)]);
        let sub = subset_where(&ds, 0, &Value::Bucket(7), DEFAULT_MAX_BRANCH_ROWS);
        assert!(sub.is_empty());
    }

    #[test]
    fn cap_keeps_first_rows() {
        let ds = dataset((0..250).map(|i| (1, i)).collect());
        let sub = subset_where(&ds, 0, &Value::Bucket(1), DEFAULT_MAX_BRANCH_ROWS);
        assert_eq!(sub.n_rows(), 100);
        for r in 0..100 {
            assert_eq!(sub.label(r), &Value::Bucket(r as i64));
        }
    }

    #[test]
    fn custom_cap() {
        let ds = dataset((0..10).map(|i| (0, i)).collect());
        let sub = subset_where(&ds, 0, &Value::Bucket(0), 3);
        assert_eq!(sub.n_rows(), 3);
        assert_eq!(sub.label(2), &Value::Bucket(2));
    }

    #[test]
    fn partitions_conserve_rows() {
        let ds = dataset(vec![(0, 1), (2, 2), (1, 3), (0, 4), (2, 5), (1, 6)]);
        let mut total = 0;
        let mut seen = Vec::new();
        for value in ds.distinct_values(0) {
            let sub = subset_where(&ds, 0, &value, DEFAULT_MAX_BRANCH_ROWS);
            total += sub.n_rows();
            seen.extend((0..sub.n_rows()).map(|r| sub.label(r).clone()));
        }
        seen.sort();
        assert_eq!(total, ds.n_rows());
        assert_eq!(seen, (1..=6).map(Value::Bucket).collect::<Vec<_>>());
    }

    #[test]
    fn parent_is_untouched() {
        let ds = dataset(vec![(1, 1), (0, 2)]);
        let before = ds.clone();
        let _ = subset_where(&ds, 0, &Value::Bucket(1), 1);
        assert_eq!(ds, before);
    }
}
