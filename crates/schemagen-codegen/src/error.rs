//! Generation errors

use schemagen_catalog::{CatalogError, ConnectionError, IntrospectionError};
use std::path::Path;

/// Errors that abort a generation run
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    #[error("Surface namespace '{namespace}' refers to a module that was never generated")]
    MergeConflictInvariantViolation { namespace: String },

    #[error("Support file {path} references a parent directory: {reference}")]
    InvalidTargetFile { path: String, reference: String },

    #[error("Module '{path}' is already registered")]
    DuplicateModule { path: String },

    #[error("IO error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("{}", crate::compat::mismatch_message(.generated, .installed))]
    VersionMismatch { generated: String, installed: String },
}

impl GenerateError {
    pub(crate) fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for GenerateError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Connection(err) => Self::Connection(err),
            CatalogError::Introspection(err) => Self::Introspection(err),
        }
    }
}
