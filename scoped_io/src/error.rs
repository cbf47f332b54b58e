//! Error type shared by codecs, writers and backends.

use std::fmt;
use std::io;

/// Boxed error coming from a transport or the operating system
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while acquiring, writing or releasing a scoped writer
#[derive(Debug)]
pub enum Error {
    /// The header was already written by this writer
    AlreadyWritten,
    /// The writer is not bound to an open transport (before acquire or after release)
    NotInitialized,
    /// The transport could not be opened; the scope was never entered
    Acquisition {
        /// Path or URI that was being opened
        target: String,
        source: BoxError,
    },
    /// The transport failed to flush, commit or close
    Release {
        /// Path or URI that was being released
        target: String,
        source: BoxError,
    },
    /// Write to an open transport failed
    Io(io::Error),
    /// The codec could not serialize a record
    Codec(String),
    /// Field names are empty or contain duplicates
    InvalidSchema(String),
    /// A row could not be built from the input value
    InvalidRow(String),
    /// Backend configuration is malformed or incomplete
    Config(String),
}

impl Error {
    pub fn acquisition(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Acquisition {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn release(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Release {
            target: target.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyWritten => write!(f, "Header already written"),
            Self::NotInitialized => write!(f, "Writer is not inside an active scope"),
            Self::Acquisition { target, source } => {
                write!(f, "Failed to acquire '{target}': {source}")
            }
            Self::Release { target, source } => {
                write!(f, "Failed to release '{target}': {source}")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Codec(msg) => write!(f, "Codec error: {msg}"),
            Self::InvalidSchema(msg) => write!(f, "Invalid schema: {msg}"),
            Self::InvalidRow(msg) => write!(f, "Invalid row: {msg}"),
            Self::Config(msg) => write!(f, "Invalid backend config: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Acquisition { source, .. } | Self::Release { source, .. } => {
                Some(source.as_ref())
            }
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io_err) => Self::Io(io_err),
                other => Self::Codec(format!("{other:?}")),
            }
        } else {
            Self::Codec(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Codec(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_acquisition_keeps_source() {
        let err = Error::acquisition(
            "/nope/out.csv",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to acquire '/nope/out.csv': denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_from_csv() {
        let csv_err = csv::Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        match Error::from(csv_err) {
            Error::Io(err) => assert_eq!(err.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }
}
