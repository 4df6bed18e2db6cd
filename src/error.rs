//! Error types for a daydiff run

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way a run can fail.
///
/// `InvalidRow` is only surfaced in strict mode; lenient mode counts the row
/// and keeps going (see [`crate::config::RowPolicy`]).
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("cannot access '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line_number}: invalid row ({reason}): {content:?}", .path.display())]
    InvalidRow {
        path: PathBuf,
        line_number: u64,
        content: String,
        reason: RowDefect,
    },
    #[error("'{}': {detail}", .path.display())]
    Encoding { path: PathBuf, detail: String },
    #[error("unknown encoding label '{0}'")]
    UnknownEncoding(String),
    #[error("cannot write run report '{}': {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a line was rejected as a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RowDefect {
    #[error("expected 3 fields, got {0}")]
    FieldCount(usize),
    #[error("empty user_id")]
    EmptyUser,
    #[error("empty product_id")]
    EmptyProduct,
}

pub type Result<T> = std::result::Result<T, DiffError>;

impl DiffError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DiffError::FileAccess {
            path: path.into(),
            source,
        }
    }
}
