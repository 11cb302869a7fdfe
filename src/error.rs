//! Error taxonomy for table operations

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Axis a bad index referred to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Errors surfaced by table construction, mutation, and codecs
#[derive(Debug, Error)]
pub enum Error {
    /// A row, merge source, or decoded record has the wrong number of columns
    #[error("expected {expected} columns, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// A row or column index is outside the table's current bounds
    #[error("{axis} index {index} out of range ({len} {axis}s)")]
    IndexOutOfRange {
        axis: Axis,
        index: usize,
        len: usize,
    },

    /// A structurally invalid argument, e.g. a zero-column table
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Attempt to remove the only remaining column
    #[error("refusing to remove the last column")]
    LastColumnRemoval,

    /// The decoded source has no rows, so the column count cannot be inferred
    #[error("source contains no rows")]
    EmptySource,

    /// CSV reader/writer failure, including shape mismatches between records
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Caller-supplied error escaping a traversal callback
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn row_out_of_range(index: usize, len: usize) -> Self {
        Error::IndexOutOfRange {
            axis: Axis::Row,
            index,
            len,
        }
    }

    pub(crate) fn column_out_of_range(index: usize, len: usize) -> Self {
        Error::IndexOutOfRange {
            axis: Axis::Column,
            index,
            len,
        }
    }
}
