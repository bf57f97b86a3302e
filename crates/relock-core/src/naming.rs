//! Lock identifier derivation.
//!
//! Names are a pure function of a container name and a suffix, so the same
//! guard always maps to the same field and no registry is needed to keep
//! them unique.

use std::fmt;

/// Suffix appended to the container name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockSuffix {
    /// Instance lock of a type: `ObjectLock`.
    Object,
    /// Type-level lock: `ClassLock`.
    Class,
    /// Lock standing in for a guarded field: `Lock`.
    Field,
}

impl LockSuffix {
    /// Text appended to the container name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "ObjectLock",
            Self::Class => "ClassLock",
            Self::Field => "Lock",
        }
    }
}

/// Name of a `ReentrantLock` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockName(String);

impl LockName {
    /// Derives the lock name for `container`: its first character
    /// lower-cased, followed by the suffix.
    #[must_use]
    pub fn derive(container: &str, suffix: LockSuffix) -> Self {
        let mut chars = container.chars();
        let mut name: String = chars
            .next()
            .map(|first| first.to_lowercase().chain(chars).collect())
            .unwrap_or_default();
        name.push_str(suffix.as_str());
        Self(name)
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
