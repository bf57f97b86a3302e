//! Lock ownership scenarios.
//!
//! Every critical section is classified into exactly one [`Scenario`], which
//! fixes the lock name, the type that owns the lock field, and the expression
//! used to reach the lock from the rewritten site.

use relock_syntax::{GuardExpr, Outline, SyntaxError, TypeDecl, TypeKind};

use crate::error::RefactorError;
use crate::module::SourceModule;
use crate::naming::{LockName, LockSuffix};
use crate::scanner::{CriticalSection, SectionKind, SkipReason};

/// How a critical section maps onto a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// `synchronized` instance method.
    MethodInstance,
    /// `static synchronized` method.
    MethodStatic,
    /// `synchronized (this)`.
    BlockSelf,
    /// `synchronized (field)` where the field's type is not a discovered
    /// type that can own the lock.
    BlockLocalField,
    /// `synchronized (field)` where the field's type is a discovered class.
    BlockForeignField,
    /// `synchronized (Type.class)` where `Type` is a discovered type.
    BlockTypeLiteral,
    /// `synchronized (Type.class)` where `Type` was not discovered.
    BlockLocalTypeLiteral,
}

/// Location of a type declaration across the discovered modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    /// Index of the module in discovery order.
    pub module: usize,
    /// Index into that module's [`Outline::types`].
    pub type_index: usize,
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    kind: TypeKind,
    at: TypeRef,
}

/// Simple-name lookup of every type in the discovered modules.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    entries: Vec<TypeEntry>,
}

impl TypeIndex {
    /// Indexes the types of `modules`, preserving discovery order.
    #[must_use]
    pub fn new(modules: &[SourceModule]) -> Self {
        let entries = modules
            .iter()
            .enumerate()
            .flat_map(|(module, source)| {
                source
                    .outline()
                    .types
                    .iter()
                    .enumerate()
                    .map(move |(type_index, ty)| TypeEntry {
                        name: ty.name.clone(),
                        kind: ty.kind,
                        at: TypeRef { module, type_index },
                    })
            })
            .collect();
        Self { entries }
    }

    /// Finds the first type named `name` that can declare a lock field with
    /// the given storage class.
    #[must_use]
    pub fn resolve(&self, name: &str, is_static: bool) -> Option<TypeRef> {
        self.entries
            .iter()
            .find(|entry| entry.name == name && entry.kind.can_host_field(is_static))
            .map(|entry| entry.at)
    }
}

/// A lock field that must exist for a site to be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRequirement {
    /// Type that owns the field.
    pub owner: TypeRef,
    /// Field name.
    pub name: LockName,
    /// Whether the field is static.
    pub is_static: bool,
    /// Whether the field must be public.
    pub public: bool,
}

/// Outcome of classifying a resolvable critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Ownership scenario.
    pub scenario: Scenario,
    /// Field the site locks on.
    pub requirement: LockRequirement,
    /// Expression naming the lock at the site.
    pub reference: String,
}

/// Result of classifying one critical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The section can be rewritten.
    Resolved(Resolution),
    /// The section is left untouched.
    Skipped(SkipReason),
}

/// Classifies `section`, found in module `module` with outline `outline`.
///
/// # Errors
///
/// Returns [`RefactorError::UnknownGuardField`] when a block guards on an
/// identifier that is not a field of its enclosing type.
pub fn classify(
    index: &TypeIndex,
    module: usize,
    outline: &Outline,
    section: &CriticalSection,
) -> Result<Classification, RefactorError> {
    let type_index = section.method.type_index;
    let Some(enclosing) = outline.types.get(type_index) else {
        return Err(SyntaxError::internal_error(format!("no type at index {type_index}")).into());
    };
    let here = TypeRef { module, type_index };

    let classification = match &section.kind {
        SectionKind::Method { is_static: false } => local(
            enclosing,
            here,
            Scenario::MethodInstance,
            LockName::derive(&enclosing.name, LockSuffix::Object),
            false,
        ),
        SectionKind::Method { is_static: true } => local(
            enclosing,
            here,
            Scenario::MethodStatic,
            LockName::derive(&enclosing.name, LockSuffix::Class),
            true,
        ),
        SectionKind::Block {
            guard: GuardExpr::SelfRef,
            ..
        } => local(
            enclosing,
            here,
            Scenario::BlockSelf,
            LockName::derive(&enclosing.name, LockSuffix::Object),
            false,
        ),
        SectionKind::Block {
            guard: GuardExpr::Field(field_name),
            ..
        } => {
            let Some(field) = enclosing.field(field_name) else {
                let method = enclosing
                    .methods
                    .get(section.method.method_index)
                    .map(|method| method.name.clone())
                    .unwrap_or_default();
                return Err(RefactorError::UnknownGuardField {
                    type_name: enclosing.name.clone(),
                    method,
                    field: field_name.clone(),
                });
            };
            let foreign = field.type_name.as_deref().and_then(|type_name| {
                index
                    .resolve(type_name, false)
                    .map(|owner| (type_name, owner))
            });
            match foreign {
                Some((type_name, owner)) => {
                    let name = LockName::derive(type_name, LockSuffix::Object);
                    let reference = format!("{field_name}.{name}");
                    resolved(
                        Scenario::BlockForeignField,
                        here,
                        owner,
                        name,
                        false,
                        reference,
                    )
                }
                None => local(
                    enclosing,
                    here,
                    Scenario::BlockLocalField,
                    LockName::derive(field_name, LockSuffix::Field),
                    field.is_static,
                ),
            }
        }
        SectionKind::Block {
            guard:
                GuardExpr::TypeLiteral {
                    name: type_name,
                    written,
                },
            ..
        } => match index.resolve(type_name, true) {
            Some(owner) => {
                let name = LockName::derive(type_name, LockSuffix::Class);
                let reference = if owner == here {
                    name.to_string()
                } else {
                    format!("{written}.{name}")
                };
                resolved(
                    Scenario::BlockTypeLiteral,
                    here,
                    owner,
                    name,
                    true,
                    reference,
                )
            }
            None => local(
                enclosing,
                here,
                Scenario::BlockLocalTypeLiteral,
                LockName::derive(type_name, LockSuffix::Class),
                true,
            ),
        },
    };

    Ok(classification)
}

/// Classifies a section whose lock lives in its enclosing type.
fn local(
    enclosing: &TypeDecl,
    here: TypeRef,
    scenario: Scenario,
    name: LockName,
    is_static: bool,
) -> Classification {
    if !enclosing.kind.can_host_field(is_static) {
        return Classification::Skipped(SkipReason::CannotHostLock {
            type_name: enclosing.name.clone(),
            kind: enclosing.kind,
            is_static,
        });
    }
    let reference = name.to_string();
    resolved(scenario, here, here, name, is_static, reference)
}

fn resolved(
    scenario: Scenario,
    here: TypeRef,
    owner: TypeRef,
    name: LockName,
    is_static: bool,
    reference: String,
) -> Classification {
    Classification::Resolved(Resolution {
        scenario,
        requirement: LockRequirement {
            owner,
            name,
            is_static,
            public: owner != here,
        },
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use relock_syntax::Parser;

    fn modules(sources: &[(&str, &str)]) -> Vec<SourceModule> {
        let mut parser = Parser::new().expect("parser init");
        sources
            .iter()
            .map(|(path, source)| {
                SourceModule::parse(&mut parser, *path, (*source).to_owned()).expect("module")
            })
            .collect()
    }

    fn classify_all(modules: &[SourceModule], module: usize) -> Vec<Classification> {
        let index = TypeIndex::new(modules);
        let outline = modules.get(module).expect("module").outline();
        scan(outline)
            .sections
            .iter()
            .map(|section| classify(&index, module, outline, section).expect("classify"))
            .collect()
    }

    fn resolution(classification: &Classification) -> &Resolution {
        match classification {
            Classification::Resolved(resolution) => resolution,
            Classification::Skipped(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn method_scenarios_use_enclosing_type() {
        let modules = modules(&[(
            "Counter.java",
            "class Counter {\n    synchronized void inc() {}\n    static synchronized void reset() {}\n}\n",
        )]);
        let results = classify_all(&modules, 0);

        let instance = resolution(results.first().expect("instance"));
        assert_eq!(instance.scenario, Scenario::MethodInstance);
        assert_eq!(instance.reference, "counterObjectLock");
        assert!(!instance.requirement.is_static);
        assert!(!instance.requirement.public);

        let class = resolution(results.get(1).expect("static"));
        assert_eq!(class.scenario, Scenario::MethodStatic);
        assert_eq!(class.reference, "counterClassLock");
        assert!(class.requirement.is_static);
    }

    #[test]
    fn foreign_field_resolves_to_owner_module() {
        let modules = modules(&[
            (
                "Panel.java",
                "class Panel {\n    private Widget component;\n    void draw() { synchronized (component) { paint(); } }\n}\n",
            ),
            ("Widget.java", "public class Widget {}\n"),
        ]);
        let results = classify_all(&modules, 0);
        let foreign = resolution(results.first().expect("section"));

        assert_eq!(foreign.scenario, Scenario::BlockForeignField);
        assert_eq!(foreign.reference, "component.widgetObjectLock");
        assert_eq!(
            foreign.requirement.owner,
            TypeRef {
                module: 1,
                type_index: 0
            }
        );
        assert!(foreign.requirement.public);
        assert!(!foreign.requirement.is_static);
    }

    #[test]
    fn unresolved_field_type_falls_back_to_local_lock() {
        let modules = modules(&[(
            "Cache.java",
            "class Cache {\n    private static final Object monitor = new Object();\n    void f() { synchronized (monitor) {} }\n}\n",
        )]);
        let results = classify_all(&modules, 0);
        let local = resolution(results.first().expect("section"));

        assert_eq!(local.scenario, Scenario::BlockLocalField);
        assert_eq!(local.reference, "monitorLock");
        assert!(local.requirement.is_static);
        assert!(!local.requirement.public);
    }

    #[test]
    fn type_literal_scenarios() {
        let modules = modules(&[
            (
                "Registry.java",
                "class Registry {\n    void a() { synchronized (Registry.class) {} }\n    void b() { synchronized (Config.class) {} }\n    void c() { synchronized (Map.class) {} }\n}\n",
            ),
            ("Config.java", "class Config {}\n"),
        ]);
        let results = classify_all(&modules, 0);

        let own = resolution(results.first().expect("own"));
        assert_eq!(own.scenario, Scenario::BlockTypeLiteral);
        assert_eq!(own.reference, "registryClassLock");
        assert!(!own.requirement.public);

        let other = resolution(results.get(1).expect("other"));
        assert_eq!(other.scenario, Scenario::BlockTypeLiteral);
        assert_eq!(other.reference, "Config.configClassLock");
        assert!(other.requirement.public);

        let unknown = resolution(results.get(2).expect("unknown"));
        assert_eq!(unknown.scenario, Scenario::BlockLocalTypeLiteral);
        assert_eq!(unknown.reference, "mapClassLock");
        assert_eq!(unknown.requirement.owner.module, 0);
        assert!(unknown.requirement.is_static);
    }

    #[test]
    fn qualified_type_literal_keeps_written_qualifier() {
        let modules = modules(&[
            (
                "app/Registry.java",
                "package com.acme.app;\n\nclass Registry {\n    void a() { synchronized (com.acme.cfg.Config.class) {} }\n    void b() { synchronized (Outer.Inner.class) {} }\n}\n",
            ),
            ("cfg/Config.java", "package com.acme.cfg;\n\npublic class Config {}\n"),
            ("app/Outer.java", "package com.acme.app;\n\nclass Outer {\n    static class Inner {}\n}\n"),
        ]);
        let results = classify_all(&modules, 0);

        let qualified = resolution(results.first().expect("qualified"));
        assert_eq!(qualified.scenario, Scenario::BlockTypeLiteral);
        assert_eq!(qualified.reference, "com.acme.cfg.Config.configClassLock");
        assert_eq!(qualified.requirement.owner.module, 1);

        let nested = resolution(results.get(1).expect("nested"));
        assert_eq!(nested.scenario, Scenario::BlockTypeLiteral);
        assert_eq!(nested.reference, "Outer.Inner.innerClassLock");
        assert_eq!(nested.requirement.owner.module, 2);
    }

    #[test]
    fn unknown_guard_field_fails() {
        let modules = modules(&[(
            "A.java",
            "class A {\n    void f(Object lock) { synchronized (lock) {} }\n}\n",
        )]);
        let index = TypeIndex::new(&modules);
        let outline = modules.first().expect("module").outline();
        let section = scan(outline).sections.into_iter().next().expect("section");

        let error = classify(&index, 0, outline, &section).expect_err("unknown field");
        assert!(matches!(
            error,
            RefactorError::UnknownGuardField { ref field, .. } if field == "lock"
        ));
    }

    #[test]
    fn records_cannot_host_instance_locks() {
        let modules = modules(&[(
            "Point.java",
            "record Point(int x) {\n    synchronized int read() { return x; }\n    static synchronized void touch() {}\n}\n",
        )]);
        let results = classify_all(&modules, 0);

        assert!(matches!(
            results.first(),
            Some(Classification::Skipped(SkipReason::CannotHostLock { .. }))
        ));
        assert!(matches!(results.get(1), Some(Classification::Resolved(_))));
    }

    #[test]
    fn interfaces_are_not_lock_owners() {
        let modules = modules(&[
            (
                "Panel.java",
                "class Panel {\n    Shape shape;\n    void f() { synchronized (shape) {} }\n}\n",
            ),
            ("Shape.java", "interface Shape {}\n"),
        ]);
        let results = classify_all(&modules, 0);
        let local = resolution(results.first().expect("section"));
        assert_eq!(local.scenario, Scenario::BlockLocalField);
        assert_eq!(local.reference, "shapeLock");
    }

    #[test]
    fn first_type_with_a_name_wins() {
        let modules = modules(&[
            ("a/Widget.java", "class Widget {}\n"),
            ("b/Widget.java", "class Widget {}\n"),
        ]);
        let index = TypeIndex::new(&modules);
        assert_eq!(
            index.resolve("Widget", false),
            Some(TypeRef {
                module: 0,
                type_index: 0
            })
        );
    }

    #[test]
    fn first_type_that_can_host_the_lock_wins() {
        let modules = modules(&[
            ("a/Widget.java", "interface Widget {}\n"),
            ("b/Widget.java", "class Widget {}\n"),
            (
                "c/Panel.java",
                "class Panel {\n    Widget component;\n    void f() { synchronized (component) {} }\n}\n",
            ),
        ]);
        let index = TypeIndex::new(&modules);
        assert_eq!(
            index.resolve("Widget", false),
            Some(TypeRef {
                module: 1,
                type_index: 0
            })
        );

        let results = classify_all(&modules, 2);
        let foreign = resolution(results.first().expect("section"));
        assert_eq!(foreign.scenario, Scenario::BlockForeignField);
        assert_eq!(foreign.reference, "component.widgetObjectLock");
        assert_eq!(foreign.requirement.owner.module, 1);
    }
}
