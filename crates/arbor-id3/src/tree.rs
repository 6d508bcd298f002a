use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, instrument, trace, warn};

use crate::{
    Id3Error,
    dataset::{Dataset, Record},
    eval::{EvaluationReport, evaluate},
    gain::{GainFunction, InformationGain},
    node::Tree,
    partition::{DEFAULT_MAX_BRANCH_ROWS, subset_where},
    predict::{Prediction, predict},
    select::select_best_column,
};

/// Configuration for ID3 induction.
///
/// Construct via [`Id3Config::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter         | Default            |
/// |-------------------|--------------------|
/// | `prune_threshold` | 0.01               |
/// | `max_branch_rows` | 100                |
/// | `max_depth`       | `None` (unlimited) |
#[derive(Debug, Clone)]
pub struct Id3Config {
    pub(crate) prune_threshold: f64,
    pub(crate) max_branch_rows: usize,
    pub(crate) max_depth: Option<usize>,
}

impl Id3Config {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prune_threshold: 0.01,
            max_branch_rows: DEFAULT_MAX_BRANCH_ROWS,
            max_depth: None,
        }
    }

    /// Set the gain below which a node's branches all become leaves.
    #[must_use]
    pub fn with_prune_threshold(mut self, prune_threshold: f64) -> Self {
        self.prune_threshold = prune_threshold;
        self
    }

    /// Set the maximum number of rows kept per branch when partitioning.
    #[must_use]
    pub fn with_max_branch_rows(mut self, max_branch_rows: usize) -> Self {
        self.max_branch_rows = max_branch_rows;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until the pruning rules stop it. `Some(d)` turns every
    /// branch at depth `d` into a majority-label leaf.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    // --- Getters ---

    /// Return the pruning threshold.
    #[must_use]
    pub fn prune_threshold(&self) -> f64 {
        self.prune_threshold
    }

    /// Return the per-branch row cap.
    #[must_use]
    pub fn max_branch_rows(&self) -> usize {
        self.max_branch_rows
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Build a tree scoring columns with Shannon [`InformationGain`].
    ///
    /// # Errors
    ///
    /// See [`Id3Config::fit_with`].
    pub fn fit(&self, dataset: &Dataset) -> Result<DecisionTree, Id3Error> {
        self.fit_with(dataset, &InformationGain)
    }

    /// Build a tree scoring columns with the supplied gain function.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                   |
    /// |--------------------------------------|----------------------------------------|
    /// | [`Id3Error::InvalidPruneThreshold`]  | threshold is negative or non-finite    |
    /// | [`Id3Error::InvalidMaxBranchRows`]   | `max_branch_rows` is zero              |
    /// | [`Id3Error::InvalidMaxDepth`]        | `max_depth` is `Some(0)`               |
    /// | [`Id3Error::EmptyDataset`]           | `dataset` has zero rows                |
    /// | [`Id3Error::ZeroFeatures`]           | `dataset` has only the label column    |
    /// | [`Id3Error::NonFiniteGain`]          | `gain_fn` returned NaN or infinity     |
    #[instrument(skip_all, fields(n_rows = dataset.n_rows(), n_columns = dataset.n_columns()))]
    pub fn fit_with<G: GainFunction + ?Sized>(
        &self,
        dataset: &Dataset,
        gain_fn: &G,
    ) -> Result<DecisionTree, Id3Error> {
        // --- Validate config ---
        if !self.prune_threshold.is_finite() || self.prune_threshold < 0.0 {
            return Err(Id3Error::InvalidPruneThreshold {
                threshold: self.prune_threshold,
            });
        }

        if self.max_branch_rows == 0 {
            return Err(Id3Error::InvalidMaxBranchRows { max_branch_rows: 0 });
        }

        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(Id3Error::InvalidMaxDepth { max_depth: 0 });
        }

        // --- Validate inputs ---
        if dataset.is_empty() {
            return Err(Id3Error::EmptyDataset);
        }

        if dataset.feature_columns().is_empty() {
            return Err(Id3Error::ZeroFeatures {
                label: dataset.label_column().to_string(),
            });
        }

        debug!(
            prune_threshold = self.prune_threshold,
            max_branch_rows = self.max_branch_rows,
            max_depth = ?self.max_depth,
            "building ID3 tree"
        );

        let root = build_tree(dataset, self, gain_fn, 0)?;

        debug!(
            n_nodes = root.n_nodes(),
            n_leaves = root.n_leaves(),
            depth = root.depth(),
            "ID3 tree built"
        );

        Ok(DecisionTree {
            root,
            feature_columns: dataset.feature_columns().to_vec(),
            label_column: dataset.label_column().to_string(),
            prune_threshold: self.prune_threshold,
        })
    }
}

impl Default for Id3Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Grow one split node over `dataset` and, recursively, its children.
///
/// The gain-threshold test uses the gain of the column chosen here, so a
/// weak split turns every one of its branches into a leaf even when the
/// branch subset is impure.
///
/// # Errors
///
/// Propagates [`select_best_column`] errors.
pub fn build_tree<G: GainFunction + ?Sized>(
    dataset: &Dataset,
    config: &Id3Config,
    gain_fn: &G,
    depth: usize,
) -> Result<Tree, Id3Error> {
    let best = select_best_column(dataset, gain_fn)?;
    let column = dataset.columns()[best.index].clone();
    trace!(%column, gain = best.gain, depth, n_rows = dataset.n_rows(), "split selected");

    let at_depth_limit = config.max_depth.is_some_and(|max_d| depth + 1 >= max_d);

    let mut children = BTreeMap::new();
    for value in dataset.distinct_values(best.index) {
        let sub = subset_where(dataset, best.index, &value, config.max_branch_rows);

        let branch = if sub.is_empty() {
            warn!(%column, %value, "partition of an observed value came back empty");
            Tree::Empty
        } else {
            let counts = sub.label_counts();
            let n_samples = sub.n_rows();
            match counts.keys().next() {
                // Pruned by gain, or pure.
                Some(&first) if best.gain < config.prune_threshold || counts.len() == 1 => {
                    Tree::Leaf {
                        label: first.clone(),
                        n_samples,
                    }
                }
                // Depth limit reached, or the subset did not shrink.
                _ if at_depth_limit || n_samples >= dataset.n_rows() => {
                    debug!(%column, %value, n_samples, depth, "stopping impure branch");
                    match sub.majority_label() {
                        Some(label) => Tree::Leaf { label, n_samples },
                        None => Tree::Empty,
                    }
                }
                _ => build_tree(&sub, config, gain_fn, depth + 1)?,
            }
        };

        children.insert(value, branch);
    }

    Ok(Tree::Split {
        column,
        gain: best.gain,
        n_samples: dataset.n_rows(),
        children,
    })
}

/// A fitted ID3 decision tree together with the schema it was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub(crate) root: Tree,
    pub(crate) feature_columns: Vec<String>,
    pub(crate) label_column: String,
    pub(crate) prune_threshold: f64,
}

impl DecisionTree {
    /// Predict the label of one record. Never fails; see [`predict`].
    #[must_use]
    pub fn predict(&self, record: &Record) -> Prediction {
        predict(&self.root, record)
    }

    /// Predict every row of `dataset`, in row order.
    #[must_use]
    pub fn predict_batch(&self, dataset: &Dataset) -> Vec<Prediction> {
        (0..dataset.n_rows())
            .map(|row| self.predict(&dataset.record(row)))
            .collect()
    }

    /// Score this tree against a labeled held-out dataset.
    #[must_use]
    pub fn evaluate(&self, test: &Dataset) -> EvaluationReport {
        evaluate(&self.root, test)
    }

    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &Tree {
        &self.root
    }

    /// Return the feature columns seen during training.
    #[must_use]
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Return the label column name seen during training.
    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Return the pruning threshold the tree was grown with.
    #[must_use]
    pub fn prune_threshold(&self) -> f64 {
        self.prune_threshold
    }

    /// Return the total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }

    /// Return the number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| Value::parse(v)).collect())
                .collect(),
        )
        .unwrap()
    }

    fn and_data() -> Dataset {
        dataset(
            &["A", "B", "Y"],
            &[
                &["1", "1", "yes"],
                &["1", "0", "no"],
                &["0", "1", "no"],
                &["0", "0", "no"],
            ],
        )
    }

    fn children(tree: &Tree) -> &BTreeMap<Value, Tree> {
        match tree {
            Tree::Split { children, .. } => children,
            other => panic!("expected split, got {other:?}"),
        }
    }

    fn column(tree: &Tree) -> &str {
        match tree {
            Tree::Split { column, .. } => column,
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn empty_dataset_error() {
        let ds = dataset(&["A", "Y"], &[]);
        let err = Id3Config::new().fit(&ds).unwrap_err();
        assert!(matches!(err, Id3Error::EmptyDataset));
    }

    #[test]
    fn zero_features_error() {
        let ds = dataset(&["Y"], &[&["yes"]]);
        let err = Id3Config::new().fit(&ds).unwrap_err();
        assert!(matches!(err, Id3Error::ZeroFeatures { .. }));
    }

    #[test]
    fn invalid_config_errors() {
        let ds = and_data();
        assert!(matches!(
            Id3Config::new().with_prune_threshold(-0.1).fit(&ds),
            Err(Id3Error::InvalidPruneThreshold { .. })
        ));
        assert!(matches!(
            Id3Config::new().with_prune_threshold(f64::NAN).fit(&ds),
            Err(Id3Error::InvalidPruneThreshold { .. })
        ));
        assert!(matches!(
            Id3Config::new().with_max_branch_rows(0).fit(&ds),
            Err(Id3Error::InvalidMaxBranchRows { .. })
        ));
        assert!(matches!(
            Id3Config::new().with_max_depth(Some(0)).fit(&ds),
            Err(Id3Error::InvalidMaxDepth { max_depth: 0 })
        ));
    }

    #[test]
    fn and_function_splits_a_then_b() {
        let tree = Id3Config::new().with_prune_threshold(0.01).fit(&and_data()).unwrap();
        let root = tree.root();
        assert_eq!(column(root), "A");

        let branches = children(root);
        assert_eq!(
            branches[&Value::Bucket(0)],
            Tree::Leaf {
                label: Value::category("no"),
                n_samples: 2
            }
        );
        let inner = &branches[&Value::Bucket(1)];
        assert_eq!(column(inner), "B");
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_leaves(), 3);
    }

    #[test]
    fn high_threshold_prunes_every_branch() {
        let tree = Id3Config::new().with_prune_threshold(0.99).fit(&and_data()).unwrap();
        assert_eq!(tree.depth(), 1);
        let branches = children(tree.root());
        // The impure A = 1 branch takes its smallest label.
        assert_eq!(
            branches[&Value::Bucket(1)],
            Tree::Leaf {
                label: Value::category("no"),
                n_samples: 2
            }
        );
    }

    #[test]
    fn pruned_leaf_takes_smallest_label_not_majority() {
        let ds = dataset(
            &["A", "Y"],
            &[&["0", "a"], &["0", "b"], &["0", "b"], &["1", "b"]],
        );
        let tree = Id3Config::new().with_prune_threshold(0.99).fit(&ds).unwrap();
        assert_eq!(
            children(tree.root())[&Value::Bucket(0)],
            Tree::Leaf {
                label: Value::category("a"),
                n_samples: 3
            }
        );
    }

    #[test]
    fn predict_batch_follows_row_order() {
        let tree = Id3Config::new().fit(&and_data()).unwrap();
        let rows = dataset(
            &["A", "B", "Y"],
            &[&["1", "1", "yes"], &["1", "5", "no"], &["0", "1", "no"]],
        );
        let batch = tree.predict_batch(&rows);
        let one_by_one: Vec<Prediction> =
            (0..rows.n_rows()).map(|r| tree.predict(&rows.record(r))).collect();
        assert_eq!(batch, one_by_one);
        assert_eq!(
            batch,
            vec![
                Prediction::Label(Value::category("yes")),
                Prediction::Unknown,
                Prediction::Label(Value::category("no")),
            ]
        );
    }

    #[test]
    fn pure_dataset_still_produces_a_split_root() {
        let ds = dataset(&["A", "Y"], &[&["0", "x"], &["1", "x"]]);
        let tree = Id3Config::new().fit(&ds).unwrap();
        assert_eq!(column(tree.root()), "A");
        assert!(children(tree.root()).values().all(Tree::is_leaf));
    }

    #[test]
    fn zero_threshold_terminates_on_unsplittable_rows() {
        // Identical features, conflicting labels: no column can separate them.
        let ds = dataset(&["A", "Y"], &[&["0", "x"], &["0", "y"], &["0", "x"]]);
        let tree = Id3Config::new().with_prune_threshold(0.0).fit(&ds).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(
            children(tree.root())[&Value::Bucket(0)],
            Tree::Leaf {
                label: Value::category("x"),
                n_samples: 3
            }
        );
    }

    #[test]
    fn max_depth_limits_tree() {
        let tree = Id3Config::new()
            .with_max_depth(Some(1))
            .fit(&and_data())
            .unwrap();
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn row_cap_is_applied_per_branch() {
        let ds = dataset(
            &["A", "Y"],
            &[&["0", "a"], &["0", "b"], &["0", "a"], &["1", "c"]],
        );
        let tree = Id3Config::new().with_max_branch_rows(2).fit(&ds).unwrap();
        assert_eq!(children(tree.root())[&Value::Bucket(0)].n_samples(), 2);
    }

    #[test]
    fn custom_gain_function_is_used() {
        // Force B to win even though A is as informative.
        let prefer_b = |_: &Dataset, column: usize| if column == 1 { 1.0 } else { 0.0 };
        let tree = Id3Config::new().fit_with(&and_data(), &prefer_b).unwrap();
        assert_eq!(column(tree.root()), "B");
    }

    #[test]
    fn schema_is_recorded() {
        let tree = Id3Config::new().fit(&and_data()).unwrap();
        assert_eq!(tree.feature_columns(), &["A".to_string(), "B".to_string()]);
        assert_eq!(tree.label_column(), "Y");
        assert!((tree.prune_threshold() - 0.01).abs() < f64::EPSILON);
    }
}
