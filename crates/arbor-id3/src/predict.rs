//! Tree walking for single records.

use std::fmt;

use crate::dataset::{Record, Value};
use crate::node::Tree;

/// Outcome of walking a tree with one record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Prediction {
    /// The label of the leaf the record reached.
    Label(Value),
    /// No leaf was reached: the record lacked a split column, carried a
    /// value the tree never saw for it, or landed on an empty leaf.
    Unknown,
}

impl Prediction {
    /// Return the predicted label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&Value> {
        match self {
            Prediction::Label(label) => Some(label),
            Prediction::Unknown => None,
        }
    }

    /// Return `true` when no leaf label was reached.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Prediction::Unknown)
    }

    /// Return `true` when the prediction equals `actual`.
    ///
    /// `Unknown` never matches, not even a label that also prints as `0`.
    #[must_use]
    pub fn matches(&self, actual: &Value) -> bool {
        self.label() == Some(actual)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Label(label) => write!(f, "{label}"),
            Prediction::Unknown => f.write_str("0"),
        }
    }
}

/// Walk `tree` from its root following `record`'s values.
///
/// A missing column or unseen value is not an error: the walk stops and
/// returns [`Prediction::Unknown`].
#[must_use]
pub fn predict(tree: &Tree, record: &Record) -> Prediction {
    let mut node = tree;
    loop {
        match node {
            Tree::Leaf { label, .. } => return Prediction::Label(label.clone()),
            Tree::Empty => return Prediction::Unknown,
            Tree::Split {
                column, children, ..
            } => {
                let Some(child) = record.get(column).and_then(|value| children.get(value)) else {
                    return Prediction::Unknown;
                };
                node = child;
            }
        }
    }
}
