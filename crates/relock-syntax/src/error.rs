//! Error types for syntactic analysis operations.
//!
//! This module provides structured error types for all operations in the
//! `relock-syntax` crate: parser initialisation, parsing, and edit rendering.

use std::ops::Range;

use thiserror::Error;

/// Errors from syntactic analysis operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the Java grammar.
    #[error("failed to initialise Java parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter did not produce a tree for the source.
    #[error("failed to parse Java source: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },

    /// Two edits claim overlapping byte ranges of the same source.
    #[error("overlapping edits at {first:?} and {second:?}")]
    OverlappingEdits {
        /// Range of the earlier edit.
        first: Range<usize>,
        /// Range of the later edit.
        second: Range<usize>,
    },

    /// An edit range falls outside the source or splits a UTF-8 sequence.
    #[error("edit range {range:?} is not valid for a source of {len} bytes")]
    InvalidEditRange {
        /// The offending range.
        range: Range<usize>,
        /// Length of the source in bytes.
        len: usize,
    },

    /// Internal error indicating a bug or system failure.
    #[error("internal error: {message}")]
    InternalError {
        /// Description of the internal error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Creates an overlapping edits error.
    #[must_use]
    pub const fn overlapping(first: Range<usize>, second: Range<usize>) -> Self {
        Self::OverlappingEdits { first, second }
    }

    /// Creates an invalid edit range error.
    #[must_use]
    pub const fn invalid_range(range: Range<usize>, len: usize) -> Self {
        Self::InvalidEditRange { range, len }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
