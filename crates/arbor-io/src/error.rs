//! I/O error types for arbor-io.

use std::path::PathBuf;

use arbor_id3::Id3Error;

/// Errors from CSV reading, preprocessing, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the header has fewer than two columns (no feature besides the label).
    #[error("no feature columns in {path}: need at least one feature and a label column")]
    NoFeatureColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when the bin count is zero.
    #[error("bins must be at least 1, got {bins}")]
    InvalidBins {
        /// The invalid bin count provided.
        bins: usize,
    },

    /// Returned when a column has no value at all to learn an imputation from.
    #[error("column \"{column}\" has no non-missing values")]
    AllMissing {
        /// Name of the column.
        column: String,
    },

    /// Returned when a table's header differs from the one the preprocessor was fitted on.
    #[error("column mismatch: fitted on {expected:?}, got {got:?}")]
    ColumnMismatch {
        /// Columns seen during fitting.
        expected: Vec<String>,
        /// Columns of the table being transformed.
        got: Vec<String>,
    },

    /// Returned when a numeric column holds a cell that is not a finite number.
    #[error("non-numeric value in column \"{column}\": row {row_index}, raw value \"{raw}\"")]
    NonNumericValue {
        /// Name of the numeric column.
        column: String,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw string that failed to parse.
        raw: String,
    },

    /// Returned when the preprocessed rows do not form a valid dataset.
    #[error("invalid dataset")]
    InvalidDataset {
        /// The underlying dataset error.
        #[from]
        source: Id3Error,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result cannot be encoded as JSON.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Path the artifact was destined for.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
