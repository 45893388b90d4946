use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures while reading a source. Anything that goes wrong inside a
/// single row is not an error; the row is dropped or the value nulled.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("malformed Arrow batch")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unexpected layout: {0}")]
    Layout(String),

    #[error("source has no '{0}' column")]
    MissingColumn(&'static str),
}
