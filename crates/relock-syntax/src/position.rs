//! Shared position and layout helpers.
//!
//! Tree-sitter positions are zero-based. For user-facing messages, we prefer
//! one-based line and column numbers. The layout helpers recover the
//! indentation of existing code so generated statements line up with it.

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// Returns the leading whitespace of the line containing `offset`.
///
/// Offsets past the end of the source or inside a multi-byte character yield
/// an empty indent.
#[must_use]
pub fn line_indent(source: &str, offset: usize) -> &str {
    let Some(before) = source.get(..offset) else {
        return "";
    };
    let line_start = before.rfind('\n').map_or(0, |pos| pos.saturating_add(1));
    let Some(line) = source.get(line_start..) else {
        return "";
    };
    let width = line
        .bytes()
        .take_while(|byte| *byte == b' ' || *byte == b'\t')
        .count();
    line.get(..width).unwrap_or_default()
}

/// Returns `end` advanced over any spaces and tabs that follow it.
///
/// Newlines stop the scan so that removing a keyword never joins lines.
#[must_use]
pub fn skip_inline_whitespace(source: &str, end: usize) -> usize {
    let trailing = source
        .get(end..)
        .map_or(0, |rest| {
            rest.bytes()
                .take_while(|byte| *byte == b' ' || *byte == b'\t')
                .count()
        });
    end.saturating_add(trailing)
}

/// Prefixes every line after the first with `extra`, leaving blank lines bare.
#[must_use]
pub fn indent_continuation_lines(text: &str, extra: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(extra);
            }
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("class A {\n    int x;\n}", 14, "    ")]
    #[case("class A {}", 3, "")]
    #[case("\tint y;", 3, "\t")]
    #[case("abc", 99, "")]
    fn line_indent_reads_leading_whitespace(
        #[case] source: &str,
        #[case] offset: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(line_indent(source, offset), expected);
    }

    #[test]
    fn skip_inline_whitespace_stops_at_newline() {
        let source = "synchronized  \nvoid";
        assert_eq!(skip_inline_whitespace(source, 12), 14);
    }

    #[test]
    fn indent_continuation_lines_keeps_first_line_and_blank_lines() {
        let text = "{\n    a();\n\n}";
        assert_eq!(
            indent_continuation_lines(text, "    "),
            "{\n        a();\n\n    }"
        );
    }
}
