//! Error type shared by the library modules.

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A size or budget argument was out of range (e.g. zero).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("input file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The input could not be read as CSV rows.
    #[error("{}: not a valid CSV file: {message}", .path.display())]
    Format { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Map an error from opening `path`, turning a missing file into `NotFound`.
    pub(crate) fn from_open(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::Io(err)
        }
    }

    /// Classify a csv error: I/O failures stay I/O, everything else is a format problem.
    pub(crate) fn from_csv(path: &Path, err: csv::Error) -> Self {
        if !err.is_io_error() {
            return Error::Format {
                path: path.to_path_buf(),
                message: err.to_string(),
            };
        }
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            other => Error::Format {
                path: path.to_path_buf(),
                message: format!("{:?}", other),
            },
        }
    }
}
