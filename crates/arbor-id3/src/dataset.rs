//! Discretized tabular data: values, datasets, and probe records.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::Id3Error;

/// A single discretized cell.
///
/// Numeric columns arrive as bucket ids after discretization; everything
/// else is a category label. Values are totally ordered (all buckets sort
/// before all categories) so that distinct-value enumeration is stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A bucket id produced by discretizing a numeric column.
    Bucket(i64),
    /// A categorical label.
    Category(String),
}

impl Value {
    /// Create a categorical value.
    #[must_use]
    pub fn category(label: impl Into<String>) -> Self {
        Value::Category(label.into())
    }

    /// Interpret a raw cell: integers become buckets, anything else a category.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(bucket) => Value::Bucket(bucket),
            Err(_) => Value::Category(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bucket(b) => write!(f, "{b}"),
            Value::Category(c) => f.write_str(c),
        }
    }
}

impl From<i64> for Value {
    fn from(bucket: i64) -> Self {
        Value::Bucket(bucket)
    }
}

impl From<&str> for Value {
    fn from(label: &str) -> Self {
        Value::Category(label.to_string())
    }
}

impl From<String> for Value {
    fn from(label: String) -> Self {
        Value::Category(label)
    }
}

/// An ordered, immutable table of discretized records.
///
/// The last column is the label; every other column is a splitting
/// candidate. Column names are shared between a dataset and the subsets
/// partitioned from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Arc<[String]>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset from column names and row-major cells.
    ///
    /// Zero rows is allowed (an empty held-out set is legal); induction
    /// rejects empty datasets separately.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`Id3Error::NoColumns`] | `columns` is empty |
    /// | [`Id3Error::DuplicateColumn`] | a column name appears twice |
    /// | [`Id3Error::RowLengthMismatch`] | a row's length differs from `columns.len()` |
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, Id3Error> {
        if columns.is_empty() {
            return Err(Id3Error::NoColumns);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Id3Error::DuplicateColumn { name: name.clone() });
            }
        }

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Id3Error::RowLengthMismatch {
                    expected: columns.len(),
                    got: row.len(),
                    row_index,
                });
            }
        }

        Ok(Self {
            columns: columns.into(),
            rows,
        })
    }

    /// Create a dataset sharing this one's columns. Rows must already match.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: Arc::clone(&self.columns),
            rows,
        }
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return `true` when the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return the number of columns, label included.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Return all column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the index of the label (last) column.
    #[must_use]
    pub fn label_index(&self) -> usize {
        self.columns.len() - 1
    }

    /// Return the name of the label column.
    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.columns[self.label_index()]
    }

    /// Return the names of all splitting candidates (every column but the last).
    #[must_use]
    pub fn feature_columns(&self) -> &[String] {
        &self.columns[..self.label_index()]
    }

    /// Return the position of `name`, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Return the rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Return the cell at (`row`, `column`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    /// Return the label of `row`.
    #[must_use]
    pub fn label(&self, row: usize) -> &Value {
        &self.rows[row][self.label_index()]
    }

    /// Return the distinct values of `column` in ascending order.
    #[must_use]
    pub fn distinct_values(&self, column: usize) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| &row[column])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Count occurrences of each label, keyed in ascending label order.
    #[must_use]
    pub fn label_counts(&self) -> BTreeMap<&Value, usize> {
        let label = self.label_index();
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(&row[label]).or_insert(0) += 1;
        }
        counts
    }

    /// Return the most frequent label; ties go to the smallest label.
    #[must_use]
    pub fn majority_label(&self) -> Option<Value> {
        self.label_counts()
            .into_iter()
            .fold(None, |best: Option<(&Value, usize)>, (label, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((label, count)),
            })
            .map(|(label, _)| label.clone())
    }

    /// Build a probe record for `row`, label column included.
    #[must_use]
    pub fn record(&self, row: usize) -> Record {
        self.columns
            .iter()
            .cloned()
            .zip(self.rows[row].iter().cloned())
            .collect()
    }
}

/// A single probe for prediction: column name to value.
///
/// Columns may be missing; the label column is never needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column value, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Add or replace a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Look up the value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Return the number of columns present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` when the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
