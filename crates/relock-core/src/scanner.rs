//! Critical-section scanning.
//!
//! Walks every method of every type in an outline and reports the
//! `synchronized` methods and top-level `synchronized` statements it finds.
//! Constructs the engine cannot rewrite are collected separately with the
//! reason, so callers can report them without failing the module.

use std::fmt;

use relock_syntax::{GuardExpr, Outline, TypeKind};

/// Position of a method inside an outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    /// Index into [`Outline::types`].
    pub type_index: usize,
    /// Index into [`relock_syntax::TypeDecl::methods`].
    pub method_index: usize,
}

/// What kind of construct a critical section is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    /// A method carrying the `synchronized` modifier.
    Method {
        /// Whether the method is `static`.
        is_static: bool,
    },
    /// A `synchronized` statement at the top level of a method body.
    Block {
        /// Index into [`relock_syntax::MethodDecl::guarded_blocks`].
        block_index: usize,
        /// What the statement locks on.
        guard: GuardExpr,
    },
}

/// A construct to rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalSection {
    /// Method containing (or being) the section.
    pub method: MethodRef,
    /// Method-level or block-level.
    pub kind: SectionKind,
}

/// Why a construct is left as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The guard is not `this`, a field, or a class literal.
    UnsupportedGuard {
        /// Source text of the guard expression.
        expression: String,
    },
    /// A `synchronized` method without a body.
    MissingBody,
    /// The owning type cannot declare the lock field.
    CannotHostLock {
        /// Type that would own the lock.
        type_name: String,
        /// Its declaration kind.
        kind: TypeKind,
        /// Whether the lock would be static.
        is_static: bool,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedGuard { expression } => {
                write!(f, "unsupported guard expression `{expression}`")
            }
            Self::MissingBody => f.write_str("synchronized method has no body"),
            Self::CannotHostLock {
                type_name,
                kind,
                is_static,
            } => {
                let storage = if *is_static { "static" } else { "instance" };
                write!(
                    f,
                    "{} `{type_name}` cannot declare {storage} lock fields",
                    kind.keyword()
                )
            }
        }
    }
}

/// A construct left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSection {
    /// Method containing (or being) the construct.
    pub method: MethodRef,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Result of scanning one outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// Sections to rewrite, in source order per method.
    pub sections: Vec<CriticalSection>,
    /// Constructs the engine will not rewrite.
    pub skipped: Vec<SkippedSection>,
}

/// Finds every critical section in `outline`.
#[must_use]
pub fn scan(outline: &Outline) -> Scan {
    let mut result = Scan::default();

    for (type_index, ty) in outline.types.iter().enumerate() {
        for (method_index, method) in ty.methods.iter().enumerate() {
            let at = MethodRef {
                type_index,
                method_index,
            };

            if method.is_synchronized() {
                if method.body.is_some() {
                    result.sections.push(CriticalSection {
                        method: at,
                        kind: SectionKind::Method {
                            is_static: method.is_static,
                        },
                    });
                } else {
                    result.skipped.push(SkippedSection {
                        method: at,
                        reason: SkipReason::MissingBody,
                    });
                }
            }

            for (block_index, block) in method.guarded_blocks.iter().enumerate() {
                match &block.guard {
                    Some(guard) => result.sections.push(CriticalSection {
                        method: at,
                        kind: SectionKind::Block {
                            block_index,
                            guard: guard.clone(),
                        },
                    }),
                    None => result.skipped.push(SkippedSection {
                        method: at,
                        reason: SkipReason::UnsupportedGuard {
                            expression: block.guard_text.clone(),
                        },
                    }),
                }
            }
        }
    }

    result
}
