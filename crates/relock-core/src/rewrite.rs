//! Site rewrites.
//!
//! A critical section becomes `lock()`, a `try` block holding the protected
//! statements, and a `finally` block calling `unlock()`. Generated lines take
//! the indentation of the construct they replace and nest by four spaces.

use relock_config::GuardedBlockPolicy;
use relock_syntax::{
    GuardedBlock, INDENT_STEP, MethodDecl, SyntaxError, TextEdit, indent_continuation_lines,
    line_indent, render_range, skip_inline_whitespace,
};

/// Replaces a `synchronized (...) { ... }` statement with an explicit lock
/// sequence on `lock`.
///
/// # Errors
///
/// Returns an error when a recorded range does not lie within `source`.
pub fn rewrite_block(
    source: &str,
    block: &GuardedBlock,
    lock: &str,
    policy: GuardedBlockPolicy,
) -> Result<TextEdit, SyntaxError> {
    let indent = line_indent(source, block.range.start);
    let protected = match policy {
        GuardedBlockPolicy::WholeBlock => slice(source, block.body.clone())?.to_owned(),
        GuardedBlockPolicy::FirstStatement => match block.statements.first() {
            Some(first) => {
                let statement = slice(source, first.clone())?;
                format!("{{\n{indent}{INDENT_STEP}{statement}\n{indent}}}")
            }
            None => format!("{{\n{indent}}}"),
        },
    };

    let replacement = format!(
        "{lock}.lock();\n{indent}try {protected} finally {{\n{indent}{INDENT_STEP}{lock}.unlock();\n{indent}}}"
    );
    Ok(TextEdit::new(block.range.clone(), replacement))
}

/// Removes the `synchronized` modifier from `method` and wraps its body in
/// an explicit lock sequence on `lock`.
///
/// `inner` holds edits inside the body (rewritten guarded blocks); they are
/// rendered into the wrapped body.
///
/// # Errors
///
/// Returns an error when the method has no body or modifier, or when an
/// inner edit does not lie within the body.
pub fn rewrite_method(
    source: &str,
    method: &MethodDecl,
    lock: &str,
    inner: &[TextEdit],
) -> Result<Vec<TextEdit>, SyntaxError> {
    let keyword = method.synchronized_keyword.clone().ok_or_else(|| {
        SyntaxError::internal_error(format!("method `{}` is not synchronized", method.name))
    })?;
    let body = method.body.clone().ok_or_else(|| {
        SyntaxError::internal_error(format!("method `{}` has no body", method.name))
    })?;

    let indent = line_indent(source, body.start);
    let rendered = render_range(source, body.clone(), inner)?;
    let wrapped = indent_continuation_lines(&rendered, INDENT_STEP);
    let step = INDENT_STEP;
    let replacement = format!(
        "{{\n{indent}{step}{lock}.lock();\n{indent}{step}try {wrapped} finally {{\n{indent}{step}{step}{lock}.unlock();\n{indent}{step}}}\n{indent}}}"
    );

    let modifier_end = skip_inline_whitespace(source, keyword.end);
    Ok(vec![
        TextEdit::delete(keyword.start..modifier_end),
        TextEdit::new(body, replacement),
    ])
}

fn slice(source: &str, range: std::ops::Range<usize>) -> Result<&str, SyntaxError> {
    source
        .get(range.clone())
        .ok_or_else(|| SyntaxError::invalid_range(range, source.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relock_syntax::{Outline, Parser, apply_edits};

    fn outline(source: &str) -> Outline {
        let mut parser = Parser::new().expect("parser init");
        let parsed = parser.parse(source).expect("parse");
        Outline::from_parse(&parsed)
    }

    fn first_method(outline: &Outline) -> &MethodDecl {
        outline
            .types
            .first()
            .and_then(|ty| ty.methods.first())
            .expect("method")
    }

    const GUARDED: &str = "class A {\n    void f() {\n        synchronized (this) {\n            one();\n            two();\n        }\n    }\n}\n";

    #[test]
    fn whole_block_keeps_every_statement() {
        let outline = outline(GUARDED);
        let block = first_method(&outline).guarded_blocks.first().expect("block");

        let edit = rewrite_block(GUARDED, block, "aObjectLock", GuardedBlockPolicy::WholeBlock)
            .expect("rewrite");
        let output = apply_edits(GUARDED, &[edit]).expect("apply");
        assert_eq!(
            output,
            "class A {\n    void f() {\n        aObjectLock.lock();\n        try {\n            one();\n            two();\n        } finally {\n            aObjectLock.unlock();\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn first_statement_truncates_the_block() {
        let outline = outline(GUARDED);
        let block = first_method(&outline).guarded_blocks.first().expect("block");

        let edit = rewrite_block(
            GUARDED,
            block,
            "aObjectLock",
            GuardedBlockPolicy::FirstStatement,
        )
        .expect("rewrite");
        let output = apply_edits(GUARDED, &[edit]).expect("apply");
        assert_eq!(
            output,
            "class A {\n    void f() {\n        aObjectLock.lock();\n        try {\n            one();\n        } finally {\n            aObjectLock.unlock();\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn first_statement_of_empty_block_is_empty_try() {
        let source = "class A {\n    void f() {\n        synchronized (this) {}\n    }\n}\n";
        let outline = outline(source);
        let block = first_method(&outline).guarded_blocks.first().expect("block");

        let edit = rewrite_block(source, block, "l", GuardedBlockPolicy::FirstStatement)
            .expect("rewrite");
        assert_eq!(
            edit.replacement(),
            "l.lock();\n        try {\n        } finally {\n            l.unlock();\n        }"
        );
    }

    #[test]
    fn method_rewrite_drops_modifier_and_wraps_body() {
        let source = "class Counter {\n    public synchronized void increment() {\n        // bump\n        count++;\n    }\n}\n";
        let outline = outline(source);
        let method = first_method(&outline);

        let edits = rewrite_method(source, method, "counterObjectLock", &[]).expect("rewrite");
        let output = apply_edits(source, &edits).expect("apply");
        assert_eq!(
            output,
            "class Counter {\n    public void increment() {\n        counterObjectLock.lock();\n        try {\n            // bump\n            count++;\n        } finally {\n            counterObjectLock.unlock();\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn method_rewrite_carries_inner_block_edits() {
        let source = "class A {\n    synchronized void f() {\n        synchronized (B.class) {\n            g();\n        }\n    }\n}\n";
        let outline = outline(source);
        let method = first_method(&outline);
        let block = method.guarded_blocks.first().expect("block");

        let inner = rewrite_block(source, block, "B.bClassLock", GuardedBlockPolicy::WholeBlock)
            .expect("block rewrite");
        let edits = rewrite_method(source, method, "aObjectLock", &[inner]).expect("rewrite");
        let output = apply_edits(source, &edits).expect("apply");
        assert_eq!(
            output,
            "class A {\n    void f() {\n        aObjectLock.lock();\n        try {\n            B.bClassLock.lock();\n            try {\n                g();\n            } finally {\n                B.bClassLock.unlock();\n            }\n        } finally {\n            aObjectLock.unlock();\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn bodiless_method_is_rejected() {
        let source = "abstract class A {\n    native synchronized void f();\n}\n";
        let outline = outline(source);
        let method = first_method(&outline);

        assert!(rewrite_method(source, method, "l", &[]).is_err());
    }
}
