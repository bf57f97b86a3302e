//! Shared configuration for the relock toolchain.
//!
//! Configuration is layered the usual way: command-line flags win over
//! `RELOCK_*` environment variables, which win over the built-in defaults
//! such as [`default_log_filter`]. The loader is a thin wrapper over `clap` so
//! both the binary and tests can load from an explicit argument list.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

mod defaults;
mod logging;
mod policy;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TEST_SUFFIXES, default_guarded_block_policy, default_log_filter,
    default_log_format, default_test_suffixes,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use policy::{GuardedBlockPolicy, GuardedBlockPolicyParseError};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Arguments or environment values were rejected. Help and version
    /// requests are surfaced here too so the caller can print them.
    #[error(transparent)]
    Arguments(#[from] clap::Error),
}

impl ConfigError {
    /// Returns whether the error is a `--help` or `--version` request rather
    /// than a failure.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        match self {
            Self::Arguments(error) => matches!(
                error.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ),
        }
    }
}

/// Rewrites `synchronized` methods and blocks into explicit `ReentrantLock`
/// acquire/release sequences.
#[derive(Debug, Clone, Parser)]
#[command(name = "relock", version)]
pub struct Config {
    /// Root directory of the Java sources. Prompted for when omitted.
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,
    /// Statements of a guarded block kept inside the rewritten `try`.
    #[arg(
        long,
        env = "RELOCK_GUARDED_BLOCK",
        value_name = "POLICY",
        default_value_t = default_guarded_block_policy()
    )]
    guarded_block: GuardedBlockPolicy,
    /// Reports the rewrite without touching any file.
    #[arg(long)]
    dry_run: bool,
    /// File name suffix (before `.java`) marking test sources. Repeatable.
    #[arg(long = "test-suffix", value_name = "SUFFIX")]
    test_suffixes: Vec<String>,
    /// Tracing filter directive, for example `relock_core=debug`.
    #[arg(
        long,
        env = "RELOCK_LOG_FILTER",
        value_name = "FILTER",
        default_value = DEFAULT_LOG_FILTER
    )]
    log_filter: String,
    /// Log output format: `compact` or `json`.
    #[arg(
        long,
        env = "RELOCK_LOG_FORMAT",
        value_name = "FORMAT",
        default_value_t = default_log_format()
    )]
    log_format: LogFormat,
}

impl Config {
    /// Loads configuration from an explicit argument list (program name
    /// first) plus the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when an argument or environment value is invalid, or
    /// when the arguments request help or version output.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Root directory supplied on the command line, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Returns a copy of the configuration with the root set.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Treatment of multi-statement `synchronized` blocks.
    #[must_use]
    pub const fn guarded_block(&self) -> GuardedBlockPolicy {
        self.guarded_block
    }

    /// Whether files are left untouched.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Test file suffixes, falling back to the defaults when none were given.
    #[must_use]
    pub fn test_suffixes(&self) -> Vec<String> {
        if self.test_suffixes.is_empty() {
            default_test_suffixes()
        } else {
            self.test_suffixes.clone()
        }
    }

    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            guarded_block: default_guarded_block_policy(),
            dry_run: false,
            test_suffixes: Vec::new(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_flag() {
        let config = Config::load_from_iter([
            "relock",
            "--guarded-block",
            "first-statement",
            "--dry-run",
            "--test-suffix",
            "IT",
            "--log-filter",
            "debug",
            "--log-format",
            "json",
            "src/main/java",
        ])
        .expect("config");

        assert_eq!(config.root(), Some(Path::new("src/main/java")));
        assert_eq!(config.guarded_block(), GuardedBlockPolicy::FirstStatement);
        assert!(config.dry_run());
        assert_eq!(config.test_suffixes(), ["IT"]);
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn rejects_unknown_policy() {
        let result = Config::load_from_iter(["relock", "--guarded-block", "everything"]);
        assert!(result.is_err());
    }

    #[test]
    fn help_is_informational() {
        let error = Config::load_from_iter(["relock", "--help"]).expect_err("help");
        assert!(error.is_informational());
    }

    #[test]
    fn default_matches_defaults_module() {
        let config = Config::default();
        assert_eq!(config.root(), None);
        assert_eq!(config.test_suffixes(), default_test_suffixes());
        assert_eq!(config.log_filter(), default_log_filter());
        assert_eq!(config.log_format(), default_log_format());
        assert_eq!(config.guarded_block(), default_guarded_block_policy());
    }
}
