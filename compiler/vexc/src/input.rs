//! The checker input file.
//!
//! The front end hands the checker a resolved module as a bincode file. Names
//! inside the module are indices into `names`, which is the front end's
//! interner table in index order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vex_ir::{Module, StringInterner};

use crate::DriverError;

/// A resolved module plus everything needed to report on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInput {
    /// Path of the original source file, used in rendered locations.
    pub source_path: String,
    /// Source text, when available, so spans render as `line:col`.
    pub source: Option<String>,
    /// Interned strings, indexed by `Name`.
    pub names: Vec<String>,
    pub module: Module,
}

impl CheckInput {
    /// Capture `module` together with the interner its names came from.
    pub fn new(
        source_path: impl Into<String>,
        source: Option<String>,
        interner: &StringInterner,
        module: Module,
    ) -> Self {
        CheckInput {
            source_path: source_path.into(),
            source,
            names: interner.to_strings(),
            module,
        }
    }

    /// Rebuild the interner so every `Name` in the module resolves.
    pub fn interner(&self) -> Result<StringInterner, DriverError> {
        Ok(StringInterner::from_strings(&self.names)?)
    }

    /// Decode an input and reject modules whose ids do not form a tree.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, DriverError> {
        let input: CheckInput =
            bincode::deserialize(bytes).map_err(|source| DriverError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        input
            .module
            .validate()
            .map_err(|source| DriverError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(input)
    }

    pub fn read(path: &Path) -> Result<Self, DriverError> {
        let bytes = fs::read(path).map_err(|e| DriverError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read checker input");
        Self::from_bytes(path, &bytes)
    }

    pub fn write(&self, path: &Path) -> Result<(), DriverError> {
        let bytes = bincode::serialize(self).map_err(|source| DriverError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes).map_err(|e| DriverError::io(path, e))
    }
}
