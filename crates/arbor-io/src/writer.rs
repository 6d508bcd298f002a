//! JSON result writer for evaluation reports and fitted trees.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_id3::{ClassMetrics, DecisionTree, EvaluationReport, Prediction, Tree, Value};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes evaluation and tree artifacts to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_report.json` and
/// `{experiment}_tree.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write an evaluation report to `{experiment}_report.json`.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | report cannot be encoded |
    /// | [`IoError::WriteFile`] | file cannot be written |
    #[instrument(skip_all)]
    pub fn write_report(&self, report: &EvaluationReport) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("report");
        let artifact = ReportArtifact {
            experiment: self.experiment.as_str(),
            n_total: report.n_total(),
            n_correct: report.n_correct(),
            n_incorrect: report.n_incorrect(),
            n_unknown: report.n_unknown(),
            accuracy_percent: report.accuracy_percent(),
            class_metrics: report.confusion_matrix().class_metrics(),
            predictions: report.predictions(),
            actual: report.actual(),
        };
        self.write_json(&path, &artifact)?;

        info!(path = %path.display(), "evaluation report written");
        Ok(path)
    }

    /// Write a fitted tree to `{experiment}_tree.json`.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | tree cannot be encoded |
    /// | [`IoError::WriteFile`] | file cannot be written |
    #[instrument(skip_all)]
    pub fn write_tree(&self, tree: &DecisionTree) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("tree");
        let artifact = TreeArtifact {
            experiment: self.experiment.as_str(),
            label_column: tree.label_column(),
            feature_columns: tree.feature_columns(),
            prune_threshold: tree.prune_threshold(),
            n_nodes: tree.n_nodes(),
            n_leaves: tree.n_leaves(),
            depth: tree.depth(),
            tree: tree.root(),
        };
        self.write_json(&path, &artifact)?;

        info!(path = %path.display(), "tree written");
        Ok(path)
    }

    fn artifact_path(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, &json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct ReportArtifact<'a> {
    experiment: &'a str,
    n_total: usize,
    n_correct: usize,
    n_incorrect: usize,
    n_unknown: usize,
    accuracy_percent: Option<f64>,
    class_metrics: Vec<ClassMetrics>,
    predictions: &'a [Prediction],
    actual: &'a [Value],
}

#[derive(Serialize)]
struct TreeArtifact<'a> {
    experiment: &'a str,
    label_column: &'a str,
    feature_columns: &'a [String],
    prune_threshold: f64,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    tree: &'a Tree,
}
