use std::path::PathBuf;

use thiserror::Error;

/// A single cell could not be coerced to the column's type.
///
/// `row` is the 1-based data row (header excluded) as it appears in the file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("row {row}: cannot parse date '{value}' (expected format {format})")]
    Date {
        row: usize,
        value: String,
        format: String,
    },
    #[error("row {row}, column {column}: '{value}' is not a number")]
    Number {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}, column {column}: '{value}' is not an integer")]
    Integer {
        row: usize,
        column: String,
        value: String,
    },
}

/// Anything that stops the dataset from loading. All variants are fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("unreadable arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("column '{column}' has unsupported type {data_type}")]
    ColumnType { column: String, data_type: String },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("dataset contains no rows")]
    EmptyDataset,
    #[error(transparent)]
    Parse(#[from] ParseError),
}
