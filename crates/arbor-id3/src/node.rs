use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dataset::Value;

/// A node of an ID3 decision tree.
///
/// Each `Split` owns its children outright, one per value of its column
/// observed while building it, keyed in ascending value order.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// A terminal node predicting a single label.
    Leaf {
        /// The predicted label.
        label: Value,
        /// Number of training rows that reached this leaf.
        n_samples: usize,
    },
    /// An interior node branching on every observed value of a column.
    Split {
        /// Name of the splitting column.
        column: String,
        /// Gain of the splitting column on the rows that reached this node.
        gain: f64,
        /// Number of training rows that reached this node.
        n_samples: usize,
        /// One subtree per observed value of `column`.
        children: BTreeMap<Value, Tree>,
    },
    /// A leaf with no label, left where a partition came back empty.
    Empty,
}

impl Tree {
    /// Return `true` for `Leaf` and `Empty`.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Tree::Split { .. })
    }

    /// Return the number of training rows that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Tree::Leaf { n_samples, .. } | Tree::Split { n_samples, .. } => *n_samples,
            Tree::Empty => 0,
        }
    }

    /// Return the total number of nodes, this one included.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        match self {
            Tree::Split { children, .. } => 1 + children.values().map(Tree::n_nodes).sum::<usize>(),
            _ => 1,
        }
    }

    /// Return the number of leaves (`Leaf` and `Empty`).
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            Tree::Split { children, .. } => children.values().map(Tree::n_leaves).sum(),
            _ => 1,
        }
    }

    /// Return the length of the longest root-to-leaf path. A lone leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Tree::Split { children, .. } => {
                1 + children.values().map(Tree::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let Tree::Split { column, children, .. } = self else {
            return writeln!(f, "{:indent$}-> {}", "", LeafLabel(self));
        };
        for (value, child) in children {
            if child.is_leaf() {
                writeln!(f, "{:indent$}{column} = {value} -> {}", "", LeafLabel(child))?;
            } else {
                writeln!(f, "{:indent$}{column} = {value}", "")?;
                child.write_indented(f, indent + 2)?;
            }
        }
        Ok(())
    }
}

struct LeafLabel<'a>(&'a Tree);

impl fmt::Display for LeafLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Tree::Leaf { label, .. } => write!(f, "{label}"),
            _ => f.write_str("?"),
        }
    }
}

/// Renders one line per branch, indented two spaces per level:
///
/// ```text
/// outlook = rain
///   wind = strong -> no
///   wind = weak -> yes
/// outlook = sunny -> no
/// ```
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Serializes as nested key-value data: `{"column": {"value": subtree}}`,
/// with leaves as their bare label and empty leaves as `null`.
impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Leaf { label, .. } => label.serialize(serializer),
            Tree::Empty => serializer.serialize_none(),
            Tree::Split { column, children, .. } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(column, &Branches(children))?;
                map.end()
            }
        }
    }
}

struct Branches<'a>(&'a BTreeMap<Value, Tree>);

impl Serialize for Branches<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, child) in self.0 {
            map.serialize_entry(&value.to_string(), child)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str, n_samples: usize) -> Tree {
        Tree::Leaf {
            label: Value::category(label),
            n_samples,
        }
    }

    fn sample_tree() -> Tree {
        let inner = Tree::Split {
            column: "b".to_string(),
            gain: 1.0,
            n_samples: 2,
            children: BTreeMap::from([
                (Value::Bucket(0), leaf("no", 1)),
                (Value::Bucket(1), leaf("yes", 1)),
            ]),
        };
        Tree::Split {
            column: "a".to_string(),
            gain: 0.31,
            n_samples: 4,
            children: BTreeMap::from([(Value::Bucket(0), leaf("no", 2)), (Value::Bucket(1), inner)]),
        }
    }

    #[test]
    fn counts_and_depth() {
        let tree = sample_tree();
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_samples(), 4);
        assert!(!tree.is_leaf());
    }

    #[test]
    fn lone_leaf_has_depth_zero() {
        let tree = leaf("x", 3);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.n_nodes(), 1);
        assert!(tree.is_leaf());
    }

    #[test]
    fn empty_is_a_leaf_without_samples() {
        assert!(Tree::Empty.is_leaf());
        assert_eq!(Tree::Empty.n_samples(), 0);
        assert_eq!(Tree::Empty.n_leaves(), 1);
    }

    #[test]
    fn display_is_indented() {
        let text = format!("{}", sample_tree());
        assert_eq!(text, "a = 0 -> no\na = 1\n  b = 0 -> no\n  b = 1 -> yes\n");
    }

    #[test]
    fn display_of_lone_leaf() {
        assert_eq!(format!("{}", leaf("yes", 1)), "-> yes\n");
    }

    #[test]
    fn serializes_as_nested_maps() {
        let json = serde_json::to_value(sample_tree()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"a": {"0": "no", "1": {"b": {"0": "no", "1": "yes"}}}})
        );
    }

    #[test]
    fn empty_serializes_as_null() {
        let tree = Tree::Split {
            column: "a".to_string(),
            gain: 0.5,
            n_samples: 1,
            children: BTreeMap::from([(Value::Bucket(3), Tree::Empty)]),
        };
        let json = serde_json::to_value(tree).unwrap();
        assert_eq!(json, serde_json::json!({"a": {"3": null}}));
    }
}
