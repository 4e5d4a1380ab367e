use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::export::SinkKind;

// ---------------------------------------------------------------------------
// ProcessingError – everything that can stop a batch or a single file
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Thickness or diameter is non-positive or not a finite number.
    #[error("invalid geometry: {parameter} must be a positive number, got {value}")]
    InvalidGeometry {
        parameter: &'static str,
        value: String,
    },

    /// A row that is not exactly three numeric fields. Rejects the whole file.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("cannot read {}: {source}", path.display())]
    InputIo {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("file name '{file_id}' was already processed in this batch")]
    DuplicateIdentity { file_id: String },

    #[error("{sink} sink: {source}")]
    SinkWriteFailure {
        sink: SinkKind,
        #[source]
        source: SinkError,
    },
}

impl ProcessingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessingError::InvalidGeometry { .. } => ErrorKind::InvalidGeometry,
            ProcessingError::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            ProcessingError::InputIo { .. } => ErrorKind::InputIo,
            ProcessingError::DuplicateIdentity { .. } => ErrorKind::DuplicateIdentity,
            ProcessingError::SinkWriteFailure { .. } => ErrorKind::SinkWriteFailure,
        }
    }
}

/// Stable label for each error variant, used in the batch summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidGeometry,
    MalformedRecord,
    InputIo,
    DuplicateIdentity,
    SinkWriteFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::InvalidGeometry => "InvalidGeometry",
            ErrorKind::MalformedRecord => "MalformedRecord",
            ErrorKind::InputIo => "InputIo",
            ErrorKind::DuplicateIdentity => "DuplicateIdentity",
            ErrorKind::SinkWriteFailure => "SinkWriteFailure",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// SinkError – backend failure of one output destination
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// The sheet was built but the workbook file could not be written at the
    /// end of the batch.
    #[error("{} was not saved: {reason}", path.display())]
    NotSaved { path: PathBuf, reason: String },
}
