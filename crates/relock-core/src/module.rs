//! Parsed source modules.

use std::fs;
use std::path::{Path, PathBuf};

use relock_syntax::{Outline, Parser};

use crate::error::ModuleError;

/// One Java compilation unit: its path, original text, and outline.
///
/// The module never changes during a pass. Edits are planned against it and
/// rendered into a fresh string, so the original text stays available for
/// every range the outline recorded.
#[derive(Debug, Clone)]
pub struct SourceModule {
    path: PathBuf,
    source: String,
    outline: Outline,
}

impl SourceModule {
    /// Parses `source` as the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError::Syntax`] when the source contains syntax errors.
    pub fn parse(
        parser: &mut Parser,
        path: impl Into<PathBuf>,
        source: String,
    ) -> Result<Self, ModuleError> {
        let path = path.into();
        let parsed = parser.parse(&source)?;
        if parsed.has_errors() {
            return Err(ModuleError::Syntax {
                path,
                errors: parsed.errors(),
            });
        }

        let outline = Outline::from_parse(&parsed);
        Ok(Self {
            path,
            source: parsed.into_source(),
            outline,
        })
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or does not parse.
    pub fn load(parser: &mut Parser, path: &Path) -> Result<Self, ModuleError> {
        let source = fs::read_to_string(path).map_err(|source| ModuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(parser, path, source)
    }

    /// Path the module was read from and is written back to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Structural outline of the source.
    #[must_use]
    pub const fn outline(&self) -> &Outline {
        &self.outline
    }
}
