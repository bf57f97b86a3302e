//! Source module discovery.
//!
//! Walks a root directory for `.java` files, drops test sources by file name
//! suffix, and parses what remains. Unreadable and unparseable files are
//! reported and left out of the working set; only an invalid root stops the
//! run.

use std::path::{Path, PathBuf};

use relock_config::default_test_suffixes;
use relock_syntax::Parser;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{DiscoveryError, ModuleError};
use crate::module::SourceModule;

const DISCOVERY_TARGET: &str = "relock_core::discovery";

/// Build output directories skipped when they sit directly under the root.
/// Deeper directories with these names are ordinary Java packages.
const BUILD_OUTPUT_DIRECTORIES: &[&str] = &["target", "build", "out", "node_modules"];

/// Controls which files count as candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    test_suffixes: Vec<String>,
}

impl DiscoveryOptions {
    /// Builds options that exclude files whose stem ends with any of
    /// `test_suffixes`.
    #[must_use]
    pub const fn new(test_suffixes: Vec<String>) -> Self {
        Self { test_suffixes }
    }

    /// Returns whether `path` names a Java source that is not a test.
    #[must_use]
    pub fn is_candidate(&self, path: &Path) -> bool {
        if path.extension().is_none_or(|ext| ext != "java") {
            return false;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            return false;
        };
        !self
            .test_suffixes
            .iter()
            .any(|suffix| !suffix.is_empty() && stem.ends_with(suffix.as_str()))
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::new(default_test_suffixes())
    }
}

/// Lists candidate files under `root`, sorted by path.
///
/// # Errors
///
/// Returns [`DiscoveryError::InvalidRoot`] when `root` is not a directory.
pub fn candidate_paths(
    root: &Path,
    options: &DiscoveryOptions,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::InvalidRoot {
            path: root.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_directory(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(
                    target: DISCOVERY_TARGET,
                    error = %error,
                    "skipping unreadable directory entry"
                );
                continue;
            }
        };
        if entry.file_type().is_file() && options.is_candidate(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    Ok(paths)
}

/// Discovers and parses every candidate module under `root`.
///
/// # Errors
///
/// Returns an error when `root` is not a directory or the parser cannot be
/// created. Per-file failures are logged and skipped.
pub fn discover(
    root: &Path,
    options: &DiscoveryOptions,
) -> Result<Vec<SourceModule>, DiscoveryError> {
    let paths = candidate_paths(root, options)?;
    let mut parser = Parser::new()?;
    let mut modules = Vec::with_capacity(paths.len());

    for path in paths {
        match SourceModule::load(&mut parser, &path) {
            Ok(module) => {
                debug!(
                    target: DISCOVERY_TARGET,
                    file = %path.display(),
                    types = module.outline().types.len(),
                    "parsed module"
                );
                modules.push(module);
            }
            Err(error) => report_rejected(&error),
        }
    }

    Ok(modules)
}

fn report_rejected(error: &ModuleError) {
    match error {
        ModuleError::Syntax { path, errors } => {
            for info in errors {
                warn!(
                    target: DISCOVERY_TARGET,
                    file = %path.display(),
                    line = info.line,
                    column = info.column,
                    "syntax error: {info}"
                );
            }
            warn!(target: DISCOVERY_TARGET, error = %error, "dropping unparseable module");
        }
        _ => warn!(target: DISCOVERY_TARGET, error = %error, "dropping module"),
    }
}

fn is_skipped_directory(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    let skipped = name.starts_with('.')
        || (entry.depth() == 1 && BUILD_OUTPUT_DIRECTORIES.contains(&name.as_ref()));
    if skipped {
        debug!(
            target: DISCOVERY_TARGET,
            directory = %entry.path().display(),
            "skipping directory"
        );
    }
    skipped
}
