//! Byte-range text edits and their application.
//!
//! Tree-sitter trees are immutable, so transformations are expressed as
//! edits against the original source. Rendering applies every edit in one
//! forward sweep; bytes outside the edited ranges are copied verbatim, which
//! keeps unrelated code exactly as the author wrote it.

use std::ops::Range;

use crate::error::SyntaxError;

/// A single replacement of a byte range with new text.
///
/// Insertions are zero-length ranges; deletions have empty replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    range: Range<usize>,
    replacement: String,
}

impl TextEdit {
    /// Builds an edit replacing `range` with `replacement`.
    #[must_use]
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Creates an insertion at the given byte offset.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset..offset, text)
    }

    /// Creates a deletion spanning the given range.
    #[must_use]
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range, String::new())
    }

    /// Byte range being replaced.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Replacement text.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    const fn is_insertion(&self) -> bool {
        self.range.start == self.range.end
    }
}

/// Applies `edits` to the whole of `source`.
///
/// Edits may be supplied in any order. Insertions sharing an offset are
/// applied in the order given.
///
/// # Errors
///
/// Returns an error if two edits overlap or if any range is out of bounds or
/// not on a UTF-8 boundary.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, SyntaxError> {
    render_range(source, 0..source.len(), edits)
}

/// Renders `source[range]` with `edits` applied.
///
/// Every edit must lie within `range`. This is how nested rewrites are
/// composed: the inner edits are rendered into the text of an enclosing
/// construct, and that text becomes the replacement of an outer edit.
///
/// # Errors
///
/// Returns an error if two edits overlap, or if an edit lies outside `range`,
/// outside the source, or off a UTF-8 boundary.
pub fn render_range(
    source: &str,
    range: Range<usize>,
    edits: &[TextEdit],
) -> Result<String, SyntaxError> {
    check_range(source, &range)?;

    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    // Stable sort keeps caller order for insertions at the same offset, and
    // places an insertion before a replacement that starts where it lands.
    sorted.sort_by_key(|edit| (edit.range.start, !edit.is_insertion()));

    let mut out = String::with_capacity(range.len());
    let mut cursor = range.start;
    let mut previous: Option<&TextEdit> = None;

    for edit in sorted {
        check_range(source, &edit.range)?;
        if edit.range.start < range.start || edit.range.end > range.end {
            return Err(SyntaxError::invalid_range(edit.range(), source.len()));
        }
        if let Some(prev) = previous {
            if edit.range.start < prev.range.end {
                return Err(SyntaxError::overlapping(prev.range(), edit.range()));
            }
        }

        let unchanged = source
            .get(cursor..edit.range.start)
            .ok_or_else(|| SyntaxError::invalid_range(cursor..edit.range.start, source.len()))?;
        out.push_str(unchanged);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
        previous = Some(edit);
    }

    let tail = source
        .get(cursor..range.end)
        .ok_or_else(|| SyntaxError::invalid_range(cursor..range.end, source.len()))?;
    out.push_str(tail);
    Ok(out)
}

fn check_range(source: &str, range: &Range<usize>) -> Result<(), SyntaxError> {
    if range.start > range.end || source.get(range.clone()).is_none() {
        return Err(SyntaxError::invalid_range(range.clone(), source.len()));
    }
    Ok(())
}
