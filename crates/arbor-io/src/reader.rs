//! CSV table reader with structural validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::RawTable;

/// Cell spellings treated as missing.
const MISSING_TOKENS: &[&str] = &["", "?", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL"];

/// Reads a labeled table from a CSV file.
///
/// Expected CSV format:
/// - Header row required: `feature1,feature2,...,label`
/// - The last column is the label
/// - One row per record, all rows must have the same number of columns
/// - Cells are trimmed; empty cells and `?`, `NA`, `NaN`, `null` are missing
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoFeatureColumns`] | Header has fewer than two columns |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct TableReader {
    path: PathBuf,
}

impl TableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`RawTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<RawTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets our own InconsistentRowLength check fire instead
        // of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let columns: Vec<String> = header.iter().map(String::from).collect();
        debug!(n_columns = columns.len(), "read CSV header");

        if columns.len() < 2 {
            return Err(IoError::NoFeatureColumns {
                path: self.path.clone(),
            });
        }

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;

            if record.len() != columns.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: columns.len(),
                    got: record.len(),
                });
            }

            let row: Vec<Option<String>> = record
                .iter()
                .map(|cell| (!MISSING_TOKENS.contains(&cell)).then(|| cell.to_string()))
                .collect();
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let table = RawTable::new(columns, rows);
        info!(
            n_rows = table.n_rows(),
            n_columns = table.columns().len(),
            n_missing = table.n_missing(),
            "table loaded"
        );

        Ok(table)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
