//! Structural outline of a Java compilation unit.
//!
//! The outline is a flat, owned summary of the parts of a syntax tree the
//! refactoring engine cares about: imports, type declarations (including
//! nested member types), their fields and methods, and the `synchronized`
//! statements at the top level of each method body. Every element keeps the
//! byte ranges needed to edit it later, so the tree itself can be dropped
//! once the outline has been built.

use std::ops::Range;

use crate::parser::ParseResult;
use crate::position::line_indent;

/// Default indentation step used when a type has no members to copy from.
pub const INDENT_STEP: &str = "    ";

/// Summary of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// End offset of the package declaration, if any.
    pub package_end: Option<usize>,
    /// Import declarations in source order.
    pub imports: Vec<ImportDecl>,
    /// Every type declaration, outer types before the types nested in them.
    pub types: Vec<TypeDecl>,
}

impl Outline {
    /// Builds the outline of a parsed compilation unit.
    #[must_use]
    pub fn from_parse(parsed: &ParseResult) -> Self {
        let source = parsed.source();
        let root = parsed.root_node();
        let mut outline = Self::default();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => outline.package_end = Some(child.end_byte()),
                "import_declaration" => outline.imports.push(ImportDecl::from_node(child, source)),
                _ => collect_type(child, source, &mut outline.types),
            }
        }

        outline
    }

    /// Returns the first type declaration with the given simple name.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|ty| ty.name == name)
    }

    /// Returns whether `name` is imported, directly or through its package
    /// wildcard.
    #[must_use]
    pub fn imports_type(&self, qualified: &str) -> bool {
        let package = qualified.rsplit_once('.').map(|(pkg, _)| pkg);
        self.imports.iter().any(|import| {
            !import.is_static
                && if import.wildcard {
                    package == Some(import.path.as_str())
                } else {
                    import.path == qualified
                }
        })
    }
}

/// An `import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Imported name without the trailing `.*`.
    pub path: String,
    /// Whether the import ends with `.*`.
    pub wildcard: bool,
    /// Whether this is an `import static`.
    pub is_static: bool,
    /// Byte range of the whole declaration.
    pub range: Range<usize>,
}

impl ImportDecl {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let mut path = String::new();
        let mut wildcard = false;
        let mut is_static = false;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "identifier" | "scoped_identifier" => path = node_text(child, source).to_owned(),
                "asterisk" => wildcard = true,
                "static" => is_static = true,
                _ => {}
            }
        }

        Self {
            path,
            wildcard,
            is_static,
            range: node.byte_range(),
        }
    }
}

/// The flavour of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `record`
    Record,
    /// `@interface`
    Annotation,
}

impl TypeKind {
    fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(Self::Class),
            "interface_declaration" => Some(Self::Interface),
            "enum_declaration" => Some(Self::Enum),
            "record_declaration" => Some(Self::Record),
            "annotation_type_declaration" => Some(Self::Annotation),
            _ => None,
        }
    }

    /// Returns whether a type of this kind may declare a private field with
    /// the given storage class.
    ///
    /// Records only admit static fields; interface and annotation fields are
    /// implicitly public constants.
    #[must_use]
    pub const fn can_host_field(self, is_static: bool) -> bool {
        match self {
            Self::Class | Self::Enum => true,
            Self::Record => is_static,
            Self::Interface | Self::Annotation => false,
        }
    }

    /// Java keyword introducing this kind of declaration.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Record => "record",
            Self::Annotation => "@interface",
        }
    }
}

/// Where new first members of a type body are inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAnchor {
    /// Byte offset of the insertion point.
    pub offset: usize,
    /// Whether a `;` must precede the new members (enums without a body
    /// declaration section).
    pub needs_separator: bool,
    /// Whether the body is empty and closes on the same line, so the
    /// insertion must also break the line before the closing brace.
    pub closes_inline: bool,
}

/// A type declaration and the members the engine inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Simple name of the type.
    pub name: String,
    /// Declaration flavour.
    pub kind: TypeKind,
    /// Indentation of the line holding the declaration.
    pub decl_indent: String,
    /// Indentation used by members of the body.
    pub member_indent: String,
    /// Insertion point for new first members.
    pub anchor: MemberAnchor,
    /// Field declarations in source order.
    pub fields: Vec<FieldDecl>,
    /// Method declarations in source order.
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    /// Returns the field declaration that declares `name`, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields
            .iter()
            .find(|field| field.names.iter().any(|declared| declared == name))
    }
}

/// Access level of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `private`
    Private,
    /// No access modifier.
    Package,
    /// `protected`
    Protected,
    /// `public`
    Public,
}

/// A field declaration, possibly declaring several variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Declared variable names.
    pub names: Vec<String>,
    /// Simple name of the declared class type, when the type is a plain,
    /// scoped, or generic class type. Primitive and array types yield `None`.
    pub type_name: Option<String>,
    /// Whether the field is `static`.
    pub is_static: bool,
    /// Declared access level.
    pub visibility: Visibility,
    /// Byte range of the access keyword, if one is present.
    pub visibility_keyword: Option<Range<usize>>,
    /// Byte range of the whole declaration.
    pub range: Range<usize>,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Whether the method is `static`.
    pub is_static: bool,
    /// Byte range of the `synchronized` modifier, if present.
    pub synchronized_keyword: Option<Range<usize>>,
    /// Byte range of the body block including braces, if the method has one.
    pub body: Option<Range<usize>>,
    /// `synchronized` statements at the top level of the body.
    pub guarded_blocks: Vec<GuardedBlock>,
}

impl MethodDecl {
    /// Returns whether the method carries the `synchronized` modifier.
    #[must_use]
    pub const fn is_synchronized(&self) -> bool {
        self.synchronized_keyword.is_some()
    }
}

/// What a `synchronized` statement locks on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GuardExpr {
    /// `synchronized (this)`
    SelfRef,
    /// `synchronized (name)` or `synchronized (this.name)`
    Field(String),
    /// `synchronized (Type.class)`.
    TypeLiteral {
        /// Simple name of the type, without qualifiers or type arguments.
        name: String,
        /// The type as written before `.class`, e.g. `com.acme.Config`.
        written: String,
    },
}

/// A `synchronized (expr) { ... }` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedBlock {
    /// Byte range of the whole statement.
    pub range: Range<usize>,
    /// Recognised guard expression, or `None` for unsupported shapes.
    pub guard: Option<GuardExpr>,
    /// Source text of the guard expression.
    pub guard_text: String,
    /// Byte range of the guarded block including braces.
    pub body: Range<usize>,
    /// Byte ranges of the statements inside the guarded block.
    pub statements: Vec<Range<usize>>,
}

fn collect_type(node: tree_sitter::Node<'_>, source: &str, types: &mut Vec<TypeDecl>) {
    let Some(kind) = TypeKind::from_node_kind(node.kind()) else {
        return;
    };
    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let name = node
        .child_by_field_name("name")
        .map(|name| node_text(name, source).to_owned())
        .unwrap_or_default();

    let decl_indent = line_indent(source, node.start_byte()).to_owned();
    let members = member_nodes(body);
    let member_indent = members
        .iter()
        .find(|member| member.start_position().row != body.start_position().row)
        .map_or_else(
            || format!("{decl_indent}{INDENT_STEP}"),
            |member| line_indent(source, member.start_byte()).to_owned(),
        );

    let mut decl = TypeDecl {
        name,
        kind,
        decl_indent,
        member_indent,
        anchor: member_anchor(body, source),
        fields: Vec::new(),
        methods: Vec::new(),
    };
    let mut nested = Vec::new();

    for member in members {
        match member.kind() {
            "field_declaration" => decl.fields.push(field_decl(member, source, false)),
            "constant_declaration" => decl.fields.push(field_decl(member, source, true)),
            "method_declaration" => decl.methods.push(method_decl(member, source)),
            _ => collect_type(member, source, &mut nested),
        }
    }

    types.push(decl);
    types.append(&mut nested);
}

/// Returns the member declarations of a type body, looking inside the body
/// declaration section of enums.
fn member_nodes(body: tree_sitter::Node<'_>) -> Vec<tree_sitter::Node<'_>> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            members.extend(child.named_children(&mut inner).filter(|n| !n.is_extra()));
        } else if child.kind() != "enum_constant" && !child.is_extra() {
            members.push(child);
        }
    }
    members
}

fn member_anchor(body: tree_sitter::Node<'_>, source: &str) -> MemberAnchor {
    let closes_inline = source
        .get(body.byte_range())
        .is_some_and(|text| !text.contains('\n') && text.trim_matches(['{', '}', ' ', '\t']).is_empty());

    if body.kind() != "enum_body" {
        return MemberAnchor {
            offset: body.start_byte().saturating_add(1),
            needs_separator: false,
            closes_inline,
        };
    }

    let mut cursor = body.walk();
    let mut last_before_close = body.start_byte().saturating_add(1);
    for child in body.children(&mut cursor) {
        match child.kind() {
            "enum_body_declarations" => {
                return MemberAnchor {
                    offset: child.start_byte().saturating_add(1),
                    needs_separator: false,
                    closes_inline,
                };
            }
            "}" => break,
            _ if child.is_extra() => {}
            _ => last_before_close = child.end_byte(),
        }
    }

    MemberAnchor {
        offset: last_before_close,
        needs_separator: true,
        closes_inline,
    }
}

fn field_decl(node: tree_sitter::Node<'_>, source: &str, interface_constant: bool) -> FieldDecl {
    let mut is_static = interface_constant;
    let mut visibility = if interface_constant {
        Visibility::Public
    } else {
        Visibility::Package
    };
    let mut visibility_keyword = None;

    if let Some(modifiers) = modifiers_node(node) {
        let mut cursor = modifiers.walk();
        for keyword in modifiers.children(&mut cursor) {
            let access = match keyword.kind() {
                "static" => {
                    is_static = true;
                    None
                }
                "private" => Some(Visibility::Private),
                "protected" => Some(Visibility::Protected),
                "public" => Some(Visibility::Public),
                _ => None,
            };
            if let Some(access) = access {
                visibility = access;
                visibility_keyword = Some(keyword.byte_range());
            }
        }
    }

    let type_name = node
        .child_by_field_name("type")
        .and_then(|ty| simple_type_name(ty, source));

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        if let Some(name) = declarator.child_by_field_name("name") {
            names.push(node_text(name, source).to_owned());
        }
    }

    FieldDecl {
        names,
        type_name,
        is_static,
        visibility,
        visibility_keyword,
        range: node.byte_range(),
    }
}

fn method_decl(node: tree_sitter::Node<'_>, source: &str) -> MethodDecl {
    let mut is_static = false;
    let mut synchronized_keyword = None;

    if let Some(modifiers) = modifiers_node(node) {
        let mut cursor = modifiers.walk();
        for keyword in modifiers.children(&mut cursor) {
            match keyword.kind() {
                "static" => is_static = true,
                "synchronized" => synchronized_keyword = Some(keyword.byte_range()),
                _ => {}
            }
        }
    }

    let name = node
        .child_by_field_name("name")
        .map(|name| node_text(name, source).to_owned())
        .unwrap_or_default();
    let body = node
        .child_by_field_name("body")
        .filter(|body| body.kind() == "block");

    let mut guarded_blocks = Vec::new();
    if let Some(block) = body {
        let mut cursor = block.walk();
        for statement in block.named_children(&mut cursor) {
            if statement.kind() == "synchronized_statement" {
                if let Some(guarded) = guarded_block(statement, source) {
                    guarded_blocks.push(guarded);
                }
            }
        }
    }

    MethodDecl {
        name,
        is_static,
        synchronized_keyword,
        body: body.map(|block| block.byte_range()),
        guarded_blocks,
    }
}

fn guarded_block(node: tree_sitter::Node<'_>, source: &str) -> Option<GuardedBlock> {
    let body = node.child_by_field_name("body")?;

    let mut cursor = node.walk();
    let expression = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "parenthesized_expression")
        .and_then(|paren| first_named_non_extra(paren));

    let guard = expression.and_then(|expr| guard_expr(expr, source));
    let guard_text = expression
        .map(|expr| node_text(expr, source).to_owned())
        .unwrap_or_default();

    let mut statements = Vec::new();
    let mut body_cursor = body.walk();
    for statement in body.named_children(&mut body_cursor) {
        if !statement.is_extra() {
            statements.push(statement.byte_range());
        }
    }

    Some(GuardedBlock {
        range: node.byte_range(),
        guard,
        guard_text,
        body: body.byte_range(),
        statements,
    })
}

fn guard_expr(expr: tree_sitter::Node<'_>, source: &str) -> Option<GuardExpr> {
    match expr.kind() {
        "this" => Some(GuardExpr::SelfRef),
        "identifier" => Some(GuardExpr::Field(node_text(expr, source).to_owned())),
        "field_access" => {
            let object = expr.child_by_field_name("object")?;
            let field = expr.child_by_field_name("field")?;
            (object.kind() == "this").then(|| GuardExpr::Field(node_text(field, source).to_owned()))
        }
        "class_literal" => {
            let ty = first_named_non_extra(expr)?;
            simple_type_name(ty, source).map(|name| GuardExpr::TypeLiteral {
                name,
                written: node_text(ty, source).to_owned(),
            })
        }
        _ => None,
    }
}

/// Reduces a type node to the simple name of its class, dropping package
/// qualifiers and type arguments.
fn simple_type_name(ty: tree_sitter::Node<'_>, source: &str) -> Option<String> {
    match ty.kind() {
        "type_identifier" => Some(node_text(ty, source).to_owned()),
        "scoped_type_identifier" => {
            let mut cursor = ty.walk();
            let last = ty
                .named_children(&mut cursor)
                .filter(|child| child.kind() == "type_identifier")
                .last()?;
            Some(node_text(last, source).to_owned())
        }
        "generic_type" => first_named_non_extra(ty).and_then(|base| simple_type_name(base, source)),
        _ => None,
    }
}

fn modifiers_node(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers");
    found
}

fn first_named_non_extra(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|child| !child.is_extra());
    found
}

fn node_text<'s>(node: tree_sitter::Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    fn outline(source: &str) -> Outline {
        let mut parser = Parser::new().expect("parser init");
        let parsed = parser.parse(source).expect("parse");
        assert!(!parsed.has_errors(), "fixture should parse: {:?}", parsed.errors());
        Outline::from_parse(&parsed)
    }

    #[test]
    fn collects_package_imports_and_types() {
        let source = "package a.b;\n\nimport java.util.List;\nimport java.util.concurrent.locks.*;\n\nclass A {}\nclass B {}\n";
        let outline = outline(source);

        assert_eq!(outline.package_end, Some(12));
        assert_eq!(outline.imports.len(), 2);
        assert!(outline.imports_type("java.util.concurrent.locks.ReentrantLock"));
        assert!(outline.imports_type("java.util.List"));
        assert!(!outline.imports_type("java.util.Map"));
        let names: Vec<_> = outline.types.iter().map(|ty| ty.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn nested_types_follow_their_outer_type() {
        let source = "class Outer {\n    static class Inner {\n        synchronized void f() {}\n    }\n    void g() {}\n}\n";
        let outline = outline(source);

        let names: Vec<_> = outline.types.iter().map(|ty| ty.name.as_str()).collect();
        assert_eq!(names, ["Outer", "Inner"]);
        let outer = outline.find_type("Outer").expect("outer");
        assert_eq!(outer.methods.len(), 1);
        let inner = outline.find_type("Inner").expect("inner");
        assert_eq!(inner.member_indent, "        ");
        assert!(inner.methods.first().is_some_and(MethodDecl::is_synchronized));
    }

    #[test]
    fn qualified_class_literal_keeps_its_written_form() {
        let source = "class A {\n    void f() {\n        synchronized (com.acme.Config.class) {}\n    }\n}\n";
        let outline = outline(source);
        let guard = outline
            .find_type("A")
            .and_then(|ty| ty.methods.first())
            .and_then(|method| method.guarded_blocks.first())
            .and_then(|block| block.guard.clone());

        assert_eq!(
            guard,
            Some(GuardExpr::TypeLiteral {
                name: "Config".to_owned(),
                written: "com.acme.Config".to_owned(),
            })
        );
    }

    #[test]
    fn fields_record_type_storage_and_visibility() {
        let source = "class A {\n    private static java.util.List<Widget> items, more;\n    Widget widget;\n    int[] counts;\n}\n";
        let outline = outline(source);
        let ty = outline.find_type("A").expect("type");

        let items = ty.field("more").expect("field");
        assert_eq!(items.names, ["items", "more"]);
        assert_eq!(items.type_name.as_deref(), Some("List"));
        assert!(items.is_static);
        assert_eq!(items.visibility, Visibility::Private);
        assert!(items.visibility_keyword.is_some());

        let widget = ty.field("widget").expect("field");
        assert_eq!(widget.type_name.as_deref(), Some("Widget"));
        assert_eq!(widget.visibility, Visibility::Package);
        assert!(widget.visibility_keyword.is_none());

        assert_eq!(ty.field("counts").and_then(|f| f.type_name.clone()), None);
    }

    #[test]
    fn methods_record_monitor_flag_and_guarded_blocks() {
        let source = "class A {\n    static synchronized void s() {}\n    void b() {\n        synchronized (this) { one(); two(); }\n        synchronized (lock) { three(); }\n        synchronized (this.lock) {}\n        synchronized (A.class) {}\n        synchronized (getLock()) {}\n        if (x) { synchronized (this) {} }\n    }\n    abstract void c();\n}\n";
        let outline = outline(source);
        let ty = outline.find_type("A").expect("type");

        let s = ty.methods.first().expect("s");
        assert!(s.is_static);
        assert!(s.is_synchronized());

        let b = ty.methods.get(1).expect("b");
        assert!(!b.is_synchronized());
        let guards: Vec<_> = b.guarded_blocks.iter().map(|g| g.guard.clone()).collect();
        assert_eq!(
            guards,
            [
                Some(GuardExpr::SelfRef),
                Some(GuardExpr::Field("lock".to_owned())),
                Some(GuardExpr::Field("lock".to_owned())),
                Some(GuardExpr::TypeLiteral {
                    name: "A".to_owned(),
                    written: "A".to_owned(),
                }),
                None,
            ]
        );
        assert_eq!(b.guarded_blocks.first().map(|g| g.statements.len()), Some(2));
        assert_eq!(b.guarded_blocks.get(4).map(|g| g.guard_text.as_str()), Some("getLock()"));

        let c = ty.methods.get(2).expect("c");
        assert!(c.body.is_none());
    }

    #[rstest::rstest]
    #[case("enum E { A, B; void f() {} }", false)]
    #[case("enum E { A, B }", true)]
    fn enum_anchor_respects_constant_list(#[case] source: &str, #[case] needs_separator: bool) {
        let outline = outline(source);
        let ty = outline.find_type("E").expect("enum");
        assert_eq!(ty.kind, TypeKind::Enum);
        assert_eq!(ty.anchor.needs_separator, needs_separator);
        let before = source.get(..ty.anchor.offset).expect("offset");
        if needs_separator {
            assert!(before.ends_with('B'));
        } else {
            assert!(before.ends_with(';'));
        }
    }

    #[test]
    fn class_anchor_sits_after_opening_brace() {
        let source = "class A {}";
        let outline = outline(source);
        let ty = outline.find_type("A").expect("type");
        assert_eq!(ty.anchor.offset, 9);
        assert!(ty.anchor.closes_inline);
        assert_eq!(ty.member_indent, INDENT_STEP);
    }

    #[rstest::rstest]
    #[case(TypeKind::Class, false, true)]
    #[case(TypeKind::Record, false, false)]
    #[case(TypeKind::Record, true, true)]
    #[case(TypeKind::Interface, true, false)]
    fn type_kind_field_hosting(#[case] kind: TypeKind, #[case] is_static: bool, #[case] expected: bool) {
        assert_eq!(kind.can_host_field(is_static), expected);
    }
}
