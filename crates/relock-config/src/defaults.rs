use crate::logging::LogFormat;
use crate::policy::GuardedBlockPolicy;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// File name suffixes (before `.java`) that mark a file as a test.
pub const DEFAULT_TEST_SUFFIXES: &[&str] = &["Test", "Tests"];

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default treatment of multi-statement `synchronized` blocks.
#[must_use]
pub const fn default_guarded_block_policy() -> GuardedBlockPolicy {
    GuardedBlockPolicy::WholeBlock
}

/// Owned copy of the default test suffixes.
#[must_use]
pub fn default_test_suffixes() -> Vec<String> {
    DEFAULT_TEST_SUFFIXES
        .iter()
        .map(|suffix| (*suffix).to_owned())
        .collect()
}
