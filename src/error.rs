use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load-time errors (fatal at startup)
// ---------------------------------------------------------------------------

/// Everything that can go wrong while turning a file into a [`LaunchDataset`].
///
/// [`LaunchDataset`]: crate::data::model::LaunchDataset
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("record {record}: {source}")]
    Row {
        record: usize,
        #[source]
        source: csv::Error,
    },

    #[error("record {record}: invalid {column} value '{value}'")]
    InvalidValue {
        record: usize,
        column: &'static str,
        value: String,
    },

    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding parquet batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Zero usable records: payload bounds are undefined.
    #[error("dataset contains no launch records")]
    EmptyDataset,
}

// ---------------------------------------------------------------------------
// Per-interaction errors (never fatal)
// ---------------------------------------------------------------------------

/// A filter selection that cannot be applied to the loaded dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("payload range is inverted: {low} > {high}")]
    InvertedRange { low: f64, high: f64 },

    #[error("payload range bounds must be finite")]
    NonFiniteBound,

    #[error("unknown launch site '{0}'")]
    UnknownSite(String),
}
