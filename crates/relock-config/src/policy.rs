//! Rewrite policies selectable by the operator.

use strum::{Display, EnumString};

/// Decides which statements of a `synchronized` block survive the rewrite.
///
/// `WholeBlock` keeps the guarded block intact inside the `try`. The
/// `FirstStatement` policy keeps only the block's first statement and drops
/// the rest, reproducing the behaviour of the tool this engine replaces; it
/// exists so that behaviour can be reproduced on purpose, never by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum GuardedBlockPolicy {
    /// Protect every statement of the guarded block.
    #[default]
    WholeBlock,
    /// Protect only the first statement of the guarded block.
    FirstStatement,
}

/// Errors encountered while parsing a [`GuardedBlockPolicy`] from text.
pub type GuardedBlockPolicyParseError = strum::ParseError;
