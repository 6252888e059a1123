//! Opaque entity version tags for optimistic concurrency.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity tag attached by the table store to every row it returns.
///
/// Callers pass the tag they read back unmodified when updating; the store
/// rejects the write when the stored row changed in the meantime. The value
/// is never inspected outside the store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    /// Wrap a store-issued tag.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw tag for the store adapter.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
