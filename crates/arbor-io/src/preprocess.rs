//! Imputation and discretization of raw tables into ID3 datasets.

use std::collections::BTreeMap;
use std::fmt;

use arbor_id3::{Dataset, Value};
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::RawTable;

/// How numeric columns are cut into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscretizationMode {
    /// Buckets of equal width between the column's minimum and maximum.
    EqualWidth,
    /// Buckets holding roughly equal numbers of training values.
    EqualFrequency,
}

impl fmt::Display for DiscretizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscretizationMode::EqualWidth => f.write_str("equal-width"),
            DiscretizationMode::EqualFrequency => f.write_str("equal-frequency"),
        }
    }
}

/// Configuration for turning raw cells into discretized values.
///
/// Construct via [`Preprocessor::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter | Default      |
/// |-----------|--------------|
/// | `bins`    | 5            |
/// | `mode`    | `EqualWidth` |
#[derive(Debug, Clone)]
pub struct Preprocessor {
    bins: usize,
    mode: DiscretizationMode,
}

impl Preprocessor {
    /// Create a new preprocessor with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bins: 5,
            mode: DiscretizationMode::EqualWidth,
        }
    }

    /// Set the number of buckets per numeric column.
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the discretization mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DiscretizationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Return the number of buckets per numeric column.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Return the discretization mode.
    #[must_use]
    pub fn mode(&self) -> DiscretizationMode {
        self.mode
    }

    /// Learn column kinds, imputation fills, and bucket edges from `table`.
    ///
    /// A feature column is numeric when every present cell parses as a
    /// finite float; otherwise it is categorical. The last (label) column
    /// is never discretized.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidBins`] | `bins` is zero |
    /// | [`IoError::AllMissing`] | a column has no present cell |
    #[instrument(skip_all, fields(n_rows = table.n_rows(), bins = self.bins, mode = %self.mode))]
    pub fn fit(&self, table: &RawTable) -> Result<FittedPreprocessor, IoError> {
        if self.bins == 0 {
            return Err(IoError::InvalidBins { bins: 0 });
        }

        let label_index = table.columns().len() - 1;
        let mut plans = Vec::with_capacity(table.columns().len());

        for (index, name) in table.columns().iter().enumerate() {
            let present: Vec<&str> = table
                .rows()
                .iter()
                .filter_map(|row| row[index].as_deref())
                .collect();
            if present.is_empty() {
                return Err(IoError::AllMissing {
                    column: name.clone(),
                });
            }

            let numeric: Option<Vec<f64>> = if index == label_index {
                None
            } else {
                present
                    .iter()
                    .map(|raw| raw.parse::<f64>().ok().filter(|v| v.is_finite()))
                    .collect()
            };

            let plan = match numeric {
                Some(values) => {
                    let fill = (values.iter().sum::<f64>() / values.len() as f64).trunc();
                    let n_missing = table.n_rows() - values.len();
                    let mut filled = values;
                    filled.extend(std::iter::repeat_n(fill, n_missing));
                    let edges = match self.mode {
                        DiscretizationMode::EqualWidth => equal_width_edges(&filled, self.bins),
                        DiscretizationMode::EqualFrequency => {
                            equal_frequency_edges(&mut filled, self.bins)
                        }
                    };
                    debug!(column = %name, fill, n_edges = edges.len(), "numeric column");
                    ColumnPlan::Numeric { fill, edges }
                }
                None => {
                    let fill = most_frequent(&present).to_string();
                    debug!(column = %name, %fill, "categorical column");
                    ColumnPlan::Categorical { fill }
                }
            };
            plans.push(plan);
        }

        let n_numeric = plans
            .iter()
            .filter(|p| matches!(p, ColumnPlan::Numeric { .. }))
            .count();
        info!(
            n_numeric,
            n_categorical = plans.len() - n_numeric,
            "preprocessor fitted"
        );

        Ok(FittedPreprocessor {
            columns: table.columns().to_vec(),
            plans,
        })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-column preprocessing learned from a training table.
#[derive(Debug, Clone, PartialEq)]
enum ColumnPlan {
    /// Fill with the most frequent category and keep the cell as is.
    Categorical { fill: String },
    /// Fill with the truncated mean and bucket by `edges`.
    Numeric { fill: f64, edges: Vec<f64> },
}

/// Whether a fitted column is discretized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Kept as categories (the label column is always categorical).
    Categorical,
    /// Cut into buckets.
    Numeric,
}

/// A preprocessor fitted on a training table, reusable on held-out tables.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedPreprocessor {
    columns: Vec<String>,
    plans: Vec<ColumnPlan>,
}

impl FittedPreprocessor {
    /// Return the columns the preprocessor was fitted on.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the kind of each column, in column order.
    #[must_use]
    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        self.plans
            .iter()
            .map(|p| match p {
                ColumnPlan::Categorical { .. } => ColumnKind::Categorical,
                ColumnPlan::Numeric { .. } => ColumnKind::Numeric,
            })
            .collect()
    }

    /// Impute and discretize `table` into a dataset.
    ///
    /// Numeric cells become [`Value::Bucket`] ids clamped to the fitted
    /// range; categorical cells go through [`Value::parse`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::ColumnMismatch`] | header differs from the fitted one |
    /// | [`IoError::NonNumericValue`] | a numeric column holds a non-number |
    /// | [`IoError::InvalidDataset`] | rows do not form a valid dataset |
    #[instrument(skip_all, fields(n_rows = table.n_rows()))]
    pub fn transform(&self, table: &RawTable) -> Result<Dataset, IoError> {
        if table.columns() != self.columns.as_slice() {
            return Err(IoError::ColumnMismatch {
                expected: self.columns.clone(),
                got: table.columns().to_vec(),
            });
        }

        let mut rows = Vec::with_capacity(table.n_rows());
        for (row_index, raw_row) in table.rows().iter().enumerate() {
            let mut row = Vec::with_capacity(raw_row.len());
            for ((cell, plan), column) in raw_row.iter().zip(&self.plans).zip(&self.columns) {
                let value = match plan {
                    ColumnPlan::Categorical { fill } => {
                        Value::parse(cell.as_deref().unwrap_or(fill))
                    }
                    ColumnPlan::Numeric { fill, edges } => {
                        let x = match cell {
                            None => *fill,
                            Some(raw) => raw
                                .parse::<f64>()
                                .ok()
                                .filter(|v| v.is_finite())
                                .ok_or_else(|| IoError::NonNumericValue {
                                    column: column.clone(),
                                    row_index,
                                    raw: raw.clone(),
                                })?,
                        };
                        Value::Bucket(bucket_of(edges, x))
                    }
                };
                row.push(value);
            }
            rows.push(row);
        }

        Ok(Dataset::new(self.columns.clone(), rows)?)
    }
}

/// Bucket id of `x`: the number of edges strictly below it.
///
/// Buckets are right-closed, so a value equal to an edge falls in the lower
/// bucket; anything outside the fitted range lands in the first or last.
fn bucket_of(edges: &[f64], x: f64) -> i64 {
    edges.partition_point(|&e| e < x) as i64
}

/// Interior cut points splitting `[min, max]` into `bins` equal-width buckets.
fn equal_width_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return Vec::new();
    }
    let width = (max - min) / bins as f64;
    (1..bins).map(|k| min + width * k as f64).collect()
}

/// Interior cut points at the `k / bins` quantiles, duplicates dropped.
fn equal_frequency_edges(values: &mut [f64], bins: usize) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    let last = values.len() - 1;
    let mut edges: Vec<f64> = (1..bins)
        .map(|k| {
            // Linear interpolation between closest ranks.
            let pos = last as f64 * k as f64 / bins as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
        })
        .collect();
    edges.dedup();
    edges
}

/// Most frequent string; ties go to the smallest.
fn most_frequent<'a>(present: &[&'a str]) -> &'a str {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &cell in present {
        *counts.entry(cell).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .fold(("", 0), |best, (cell, count)| if count > best.1 { (cell, count) } else { best })
        .0
}
