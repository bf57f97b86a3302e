//! Tree-sitter powered Java syntax support for the relock toolchain.
//!
//! This crate is the engine's view of Java source code:
//!
//! - **Parsing** via [`Parser`], with error-node diagnostics in
//!   [`SyntaxErrorInfo`]
//! - **Outlining** via [`Outline`], an owned summary of types, fields,
//!   methods, and `synchronized` statements with the byte ranges needed to
//!   edit them
//! - **Rendering** via [`apply_edits`] and [`render_range`], which splice
//!   [`TextEdit`]s into the original text so untouched code is preserved
//!   byte for byte
//!
//! # Example
//!
//! ```
//! use relock_syntax::{Outline, Parser, TextEdit, apply_edits};
//!
//! let mut parser = Parser::new()?;
//! let parsed = parser.parse("class Counter { synchronized void inc() {} }")?;
//! let outline = Outline::from_parse(&parsed);
//!
//! let counter = outline.find_type("Counter").expect("type");
//! let keyword = counter.methods[0].synchronized_keyword.clone().expect("modifier");
//! let output = apply_edits(parsed.source(), &[TextEdit::delete(keyword)])?;
//! assert_eq!(output, "class Counter {  void inc() {} }");
//! # Ok::<(), relock_syntax::SyntaxError>(())
//! ```

mod edit;
mod error;
mod outline;
mod parser;
mod position;

pub use edit::{TextEdit, apply_edits, render_range};
pub use error::SyntaxError;
pub use outline::{
    FieldDecl, GuardExpr, GuardedBlock, INDENT_STEP, ImportDecl, MemberAnchor, MethodDecl,
    Outline, TypeDecl, TypeKind, Visibility,
};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use position::{indent_continuation_lines, line_indent, skip_inline_whitespace};

#[cfg(test)]
mod tests;
