//! Rewrites Java monitor locking into explicit `ReentrantLock` sequences.
//!
//! The engine turns `synchronized` methods and top-level `synchronized`
//! statements into `lock()` / `try` / `finally { unlock(); }` sequences on a
//! named `ReentrantLock` field, across every module under a source root:
//!
//! - [`discover`] finds and parses the non-test `.java` files
//! - [`scan`] lists the critical sections of a module
//! - [`classify`] maps each section onto a [`Scenario`], which fixes the lock
//!   name and the type that owns the lock field, possibly in another module
//! - [`RefactorPass`] plans all modules first, then renders and writes each
//!   changed module exactly once
//!
//! # Example
//!
//! ```ignore
//! use relock_config::Config;
//! use relock_core::refactor_root;
//!
//! let config = Config::default();
//! let report = refactor_root(Path::new("src/main/java"), &config)?;
//! println!("{report}");
//! ```

use std::path::Path;

use relock_config::Config;

mod discovery;
mod error;
mod module;
mod naming;
mod pass;
mod report;
mod resolver;
mod rewrite;
mod scanner;
mod scenario;

pub use discovery::{DiscoveryOptions, candidate_paths, discover};
pub use error::{DiscoveryError, ModuleError, RefactorError};
pub use module::SourceModule;
pub use naming::{LockName, LockSuffix};
pub use pass::{ModulePlan, Plan, RefactorPass, RenderedModule, Site};
pub use report::{ModuleOutcome, ModuleStatus, PassReport};
pub use resolver::{LockEdits, LockSpec, LockTable, REENTRANT_LOCK, field_declaration, lock_edits};
pub use rewrite::{rewrite_block, rewrite_method};
pub use scanner::{CriticalSection, MethodRef, Scan, SectionKind, SkipReason, SkippedSection, scan};
pub use scenario::{
    Classification, LockRequirement, Resolution, Scenario, TypeIndex, TypeRef, classify,
};

/// Discovers every module under `root` and runs one pass over them.
///
/// # Errors
///
/// Returns an error when `root` is not a directory or the parser cannot be
/// created. Failures of individual modules are recorded in the report.
pub fn refactor_root(root: &Path, config: &Config) -> Result<PassReport, DiscoveryError> {
    let options = DiscoveryOptions::new(config.test_suffixes());
    let modules = discover(root, &options)?;
    Ok(RefactorPass::from_config(config).run(&modules))
}

#[cfg(test)]
mod tests;
