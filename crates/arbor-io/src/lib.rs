//! File I/O, preprocessing, and serialization for the arbor pipeline.

mod domain;
mod error;
mod preprocess;
mod reader;
mod writer;

pub use domain::{ExperimentName, RawTable};
pub use error::IoError;
pub use preprocess::{ColumnKind, DiscretizationMode, FittedPreprocessor, Preprocessor};
pub use reader::TableReader;
pub use writer::ResultWriter;
