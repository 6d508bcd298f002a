//! ID3 decision-tree classification: build, predict, evaluate.
//!
//! Provides a hand-rolled ID3 learner over discretized tabular data:
//! information-gain column selection, capped recursive partitioning,
//! gain-threshold pre-pruning, fault-tolerant prediction, and held-out
//! evaluation with per-class metrics.

mod confusion;
mod dataset;
mod error;
mod eval;
mod gain;
mod holdout;
mod node;
mod partition;
mod predict;
mod select;
mod tree;

pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use dataset::{Dataset, Record, Value};
pub use error::Id3Error;
pub use eval::{EvaluationReport, evaluate};
pub use gain::{GainFunction, InformationGain, entropy};
pub use holdout::{Holdout, stratified_holdout};
pub use node::Tree;
pub use partition::{DEFAULT_MAX_BRANCH_ROWS, subset_where};
pub use predict::{Prediction, predict};
pub use select::{BestColumn, select_best_column};
pub use tree::{DecisionTree, Id3Config, build_tree};
