/// Errors from ID3 induction and dataset construction.
#[derive(Debug, thiserror::Error)]
pub enum Id3Error {
    /// Returned when a dataset is built with no columns at all.
    #[error("dataset must have at least one column")]
    NoColumns,

    /// Returned when two columns share the same name.
    #[error("duplicate column name \"{name}\"")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },

    /// Returned when a row has a different number of cells than there are columns.
    #[error("row {row_index} has {got} cells, expected {expected}")]
    RowLengthMismatch {
        /// The expected number of cells (the column count).
        expected: usize,
        /// The actual number of cells in the row.
        got: usize,
        /// The zero-based index of the offending row.
        row_index: usize,
    },

    /// Returned when induction is attempted on a dataset with zero rows.
    #[error("training dataset has zero rows")]
    EmptyDataset,

    /// Returned when the dataset has no column besides the label.
    #[error("dataset has zero feature columns (only the label column \"{label}\")")]
    ZeroFeatures {
        /// Name of the label column.
        label: String,
    },

    /// Returned when the gain function yields NaN or infinity.
    #[error("gain function returned non-finite value {value} for column \"{column}\"")]
    NonFiniteGain {
        /// The column being scored.
        column: String,
        /// The offending gain value.
        value: f64,
    },

    /// Returned when the pruning threshold is negative or non-finite.
    #[error("prune_threshold must be finite and >= 0.0, got {threshold}")]
    InvalidPruneThreshold {
        /// The invalid threshold provided.
        threshold: f64,
    },

    /// Returned when the per-branch row cap is zero.
    #[error("max_branch_rows must be at least 1, got {max_branch_rows}")]
    InvalidMaxBranchRows {
        /// The invalid cap provided.
        max_branch_rows: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when the holdout fraction is outside (0.0, 1.0).
    #[error("test_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },
}
