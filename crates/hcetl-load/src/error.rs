use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors raised while provisioning or filling a target table.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open sink at {target}: {source}")]
    Open {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to provision table {table}: {source}")]
    Provision {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to insert into {table} (batch starting at row {row}): {source}")]
    Insert {
        table: String,
        row: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("row {row} of {table} has {actual} values, expected {expected}")]
    RowShape {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("table {0} has not been provisioned")]
    NotProvisioned(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl SinkError {
    /// True for failures that may succeed if the same load is attempted again:
    /// I/O errors and a busy or locked database.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Open { source, .. }
            | Self::Provision { source, .. }
            | Self::Insert { source, .. } => matches!(
                source.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            Self::Io { .. } => true,
            Self::Csv { source, .. } => source.is_io_error(),
            Self::InvalidIdentifier(_) | Self::RowShape { .. } | Self::NotProvisioned(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_is_retryable_and_shape_is_not() {
        let io = SinkError::Io {
            path: PathBuf::from("out.csv"),
            source: std::io::Error::other("disk full"),
        };
        assert!(io.is_retryable());
        assert!(!SinkError::InvalidIdentifier("a b".into()).is_retryable());
    }

    #[test]
    fn busy_database_is_retryable() {
        let busy = SinkError::Insert {
            table: "main.fact_admissions".into(),
            row: 0,
            source: rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
                None,
            ),
        };
        assert!(busy.is_retryable());
    }
}
