//! Lock field resolution.
//!
//! Requirements gathered from every module are merged into a [`LockTable`].
//! When a module is rendered, the table is turned into edits: existing
//! fields are reused (and made public where another type reaches them), and
//! missing fields are declared as the first members of their type together
//! with the `ReentrantLock` import.

use std::collections::{BTreeMap, BTreeSet};

use relock_syntax::{FieldDecl, Outline, TextEdit, TypeDecl, Visibility};

use crate::naming::LockName;
use crate::scenario::{LockRequirement, TypeRef};

/// Fully qualified name of the lock class.
pub const REENTRANT_LOCK: &str = "java.util.concurrent.locks.ReentrantLock";

/// Merged storage and access needs of one lock field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockSpec {
    /// Whether any site needs the field to be static.
    pub is_static: bool,
    /// Whether any site outside the owning type reaches the field.
    pub public: bool,
}

/// Every lock field required across the discovered modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockTable {
    entries: BTreeMap<(TypeRef, LockName), LockSpec>,
}

impl LockTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Records a requirement, merging it with any earlier one for the same
    /// field.
    pub fn require(&mut self, requirement: LockRequirement) {
        let spec = self
            .entries
            .entry((requirement.owner, requirement.name))
            .or_default();
        spec.is_static |= requirement.is_static;
        spec.public |= requirement.public;
    }

    /// Merged spec of one field, if any site requires it.
    #[must_use]
    pub fn get(&self, owner: TypeRef, name: &LockName) -> Option<LockSpec> {
        self.entries.get(&(owner, name.clone())).copied()
    }

    /// Number of distinct lock fields required.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no lock is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Requirements owned by types of `module`, ordered by type then name.
    pub fn for_module(&self, module: usize) -> impl Iterator<Item = (TypeRef, &LockName, LockSpec)> {
        self.entries
            .iter()
            .filter(move |((owner, _), _)| owner.module == module)
            .map(|((owner, name), spec)| (*owner, name, *spec))
    }
}

/// Edits that materialise the lock fields one module owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockEdits {
    /// Field declarations, visibility changes, and the import.
    pub edits: Vec<TextEdit>,
    /// Names of fields declared by the edits.
    pub created: Vec<LockName>,
    /// Names of existing fields made public.
    pub promoted: Vec<LockName>,
}

/// Builds the edits that give module `module` (with `outline`) every lock
/// field `table` assigns to it.
#[must_use]
pub fn lock_edits(module: usize, outline: &Outline, table: &LockTable) -> LockEdits {
    let mut result = LockEdits::default();
    let mut by_type: BTreeMap<usize, Vec<(&LockName, LockSpec)>> = BTreeMap::new();
    for (owner, name, spec) in table.for_module(module) {
        by_type.entry(owner.type_index).or_default().push((name, spec));
    }

    for (type_index, locks) in by_type {
        let Some(ty) = outline.types.get(type_index) else {
            continue;
        };
        let mut declarations = Vec::new();
        let mut promoted_fields = BTreeSet::new();

        for (name, spec) in locks {
            match ty.field(name.as_str()) {
                Some(field) => {
                    if spec.public && field.visibility != Visibility::Public {
                        if promoted_fields.insert(field.range.start) {
                            result.edits.push(promotion(field));
                        }
                        result.promoted.push(name.clone());
                    }
                }
                None => {
                    declarations.push(field_declaration(name, spec));
                    result.created.push(name.clone());
                }
            }
        }

        if !declarations.is_empty() {
            result.edits.push(member_insertion(ty, &declarations));
        }
    }

    if !result.created.is_empty() {
        if let Some(edit) = import_edit(outline) {
            result.edits.push(edit);
        }
    }
    result
}

/// Source text declaring a lock field.
#[must_use]
pub fn field_declaration(name: &LockName, spec: LockSpec) -> String {
    let access = if spec.public { "public" } else { "private" };
    let storage = if spec.is_static { "static " } else { "" };
    format!("{access} {storage}ReentrantLock {name} = new ReentrantLock();")
}

fn promotion(field: &FieldDecl) -> TextEdit {
    match &field.visibility_keyword {
        Some(keyword) => TextEdit::new(keyword.clone(), "public"),
        None => TextEdit::insert(field.range.start, "public "),
    }
}

fn member_insertion(ty: &TypeDecl, declarations: &[String]) -> TextEdit {
    let mut text = String::new();
    if ty.anchor.needs_separator {
        text.push(';');
    }
    for declaration in declarations {
        text.push('\n');
        text.push_str(&ty.member_indent);
        text.push_str(declaration);
    }
    if ty.anchor.closes_inline {
        text.push('\n');
        text.push_str(&ty.decl_indent);
    }
    TextEdit::insert(ty.anchor.offset, text)
}

fn import_edit(outline: &Outline) -> Option<TextEdit> {
    if outline.imports_type(REENTRANT_LOCK) {
        return None;
    }
    let edit = if let Some(last) = outline.imports.last() {
        TextEdit::insert(last.range.end, format!("\nimport {REENTRANT_LOCK};"))
    } else if let Some(package_end) = outline.package_end {
        TextEdit::insert(package_end, format!("\n\nimport {REENTRANT_LOCK};"))
    } else {
        TextEdit::insert(0, format!("import {REENTRANT_LOCK};\n\n"))
    };
    Some(edit)
}
