//! Failures of the driver itself, as opposed to diagnostics about the
//! checked program.

use std::io;
use std::path::{Path, PathBuf};

use vex_ir::{InternError, ModuleError};

/// Why the driver could not load, check, or save a module.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("cannot find file '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied accessing '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("error accessing '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is not a valid checker input: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("'{}' is not a well-formed module: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ModuleError,
    },

    #[error("failed to encode '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("name table is unusable: {0}")]
    Intern(InternError),

    #[error("invalid option '{0}'")]
    InvalidOption(String),

    #[error("missing input file")]
    MissingInput,

    #[error("unknown error code: {0}")]
    UnknownCode(String),

    #[error("no documentation available for {0}")]
    NoDocs(String),
}

impl DriverError {
    /// Classify an I/O failure on `path`.
    pub fn io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => DriverError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => DriverError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DriverError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

impl From<InternError> for DriverError {
    fn from(err: InternError) -> Self {
        DriverError::Intern(err)
    }
}
