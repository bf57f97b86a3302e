//! Error types for discovery and the refactor pass.

use std::io;
use std::path::PathBuf;

use relock_syntax::{SyntaxError, SyntaxErrorInfo};
use thiserror::Error;

/// Errors that stop discovery before any module is produced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// The supplied root does not exist or is not a directory.
    #[error("source root {path:?} is not a directory")]
    InvalidRoot {
        /// Path supplied by the operator.
        path: PathBuf,
    },

    /// The Java parser could not be initialised.
    #[error(transparent)]
    Parser(#[from] SyntaxError),
}

/// Reasons a candidate file is dropped from the working set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModuleError {
    /// The file could not be read as UTF-8 text.
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The file parsed with syntax errors.
    #[error("{path:?} has {count} syntax error(s)", count = .errors.len())]
    Syntax {
        /// File that failed to parse.
        path: PathBuf,
        /// One entry per error node.
        errors: Vec<SyntaxErrorInfo>,
    },

    /// The parser gave up without producing a tree.
    #[error(transparent)]
    Parser(#[from] SyntaxError),
}

/// Errors raised while planning or rendering one module.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RefactorError {
    /// A block guards on a name that is not a field of the enclosing type.
    #[error("`{type_name}.{method}` synchronizes on `{field}`, which is not a field of `{type_name}`")]
    UnknownGuardField {
        /// Enclosing type.
        type_name: String,
        /// Method holding the guarded block.
        method: String,
        /// Guard identifier.
        field: String,
    },

    /// Rendering the module's edits failed.
    #[error("failed to render edits: {0}")]
    Render(#[from] SyntaxError),

    /// The rendered module could not be written back.
    #[error("failed to write {path:?}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
