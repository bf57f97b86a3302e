//! Pass outcome reporting.

use std::fmt;
use std::path::PathBuf;

/// What happened to one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatus {
    /// New source was produced (and written unless the pass was a dry run).
    Rewritten,
    /// Nothing to change.
    Unchanged,
    /// Planning or rendering failed; the module's own critical sections
    /// were left untouched.
    Failed(String),
    /// The new source could not be written; the file keeps its old content.
    WriteFailed(String),
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rewritten => f.write_str("rewritten"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::WriteFailed(reason) => write!(f, "write failed: {reason}"),
        }
    }
}

/// Per-module result of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    /// Module path.
    pub path: PathBuf,
    /// Final status.
    pub status: ModuleStatus,
    /// Critical sections rewritten in this module.
    pub sections_rewritten: usize,
    /// Critical sections left untouched with a warning.
    pub sections_skipped: usize,
    /// Lock fields declared in this module.
    pub locks_created: usize,
    /// Existing lock fields made public in this module.
    pub locks_promoted: usize,
}

impl ModuleOutcome {
    /// Creates an outcome with every counter at zero.
    #[must_use]
    pub const fn new(path: PathBuf, status: ModuleStatus) -> Self {
        Self {
            path,
            status,
            sections_rewritten: 0,
            sections_skipped: 0,
            locks_created: 0,
            locks_promoted: 0,
        }
    }
}

/// Summary of a whole pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Outcomes in module order.
    pub outcomes: Vec<ModuleOutcome>,
    /// Whether files were left untouched.
    pub dry_run: bool,
}

impl PassReport {
    /// Number of modules with the given status kind.
    fn count(&self, matches: impl Fn(&ModuleStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches(&outcome.status))
            .count()
    }

    /// Modules that received new source.
    #[must_use]
    pub fn rewritten(&self) -> usize {
        self.count(|status| matches!(status, ModuleStatus::Rewritten))
    }

    /// Modules left as they were.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(|status| matches!(status, ModuleStatus::Unchanged))
    }

    /// Modules whose plan or render failed, or whose write failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| {
            matches!(status, ModuleStatus::Failed(_) | ModuleStatus::WriteFailed(_))
        })
    }

    /// Critical sections rewritten across all modules.
    #[must_use]
    pub fn sections_rewritten(&self) -> usize {
        self.outcomes.iter().map(|o| o.sections_rewritten).sum()
    }

    /// Critical sections skipped across all modules.
    #[must_use]
    pub fn sections_skipped(&self) -> usize {
        self.outcomes.iter().map(|o| o.sections_skipped).sum()
    }

    /// Lock fields declared across all modules.
    #[must_use]
    pub fn locks_created(&self) -> usize {
        self.outcomes.iter().map(|o| o.locks_created).sum()
    }

    /// Lock fields promoted across all modules.
    #[must_use]
    pub fn locks_promoted(&self) -> usize {
        self.outcomes.iter().map(|o| o.locks_promoted).sum()
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} module(s) rewritten, {} unchanged, {} failed; {} critical section(s) rewritten, {} skipped; {} lock(s) created, {} promoted",
            self.rewritten(),
            self.unchanged(),
            self.failed(),
            self.sections_rewritten(),
            self.sections_skipped(),
            self.locks_created(),
            self.locks_promoted(),
        )?;
        if self.dry_run {
            f.write_str(" (dry run)")?;
        }
        Ok(())
    }
}
